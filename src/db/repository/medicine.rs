use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Medicine;

const MEDICINE_COLUMNS: &str = "m.id, m.name, m.details, m.quantity, m.stocked_on, m.expires_on,
     m.manufacturer, m.batch_no, m.storage, m.prescription_required";

pub fn insert_medicine(conn: &Connection, med: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, name, details, quantity, stocked_on, expires_on,
         manufacturer, batch_no, storage, prescription_required)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.name,
            med.details,
            med.quantity,
            med.stocked_on.to_string(),
            med.expires_on.map(|d| d.to_string()),
            med.manufacturer,
            med.batch_no,
            med.storage,
            med.prescription_required as i32,
        ],
    )?;
    Ok(())
}

pub fn get_medicine(conn: &Connection, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines m WHERE m.id = ?1"),
            params![id.to_string()],
            medicine_row_from_rusqlite,
        )
        .optional()?;
    row.map(medicine_from_row).transpose()
}

/// Full inventory ordered by name.
pub fn get_all_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines m ORDER BY m.name"
    ))?;
    let rows = stmt.query_map([], medicine_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row?)?);
    }
    Ok(meds)
}

pub fn update_medicine_quantity(
    conn: &Connection,
    id: &Uuid,
    quantity: u32,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicines SET quantity = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![quantity, id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Medicine", id));
    }
    Ok(())
}

/// Number of schedules that reference this medicine.
pub fn count_schedules_for_medicine(conn: &Connection, id: &Uuid) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medicine_schedules WHERE medicine_id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn delete_medicine(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM medicines WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Medicine", id));
    }
    Ok(())
}

/// Medicines on any of the patient's schedules expiring within [from, until].
pub fn get_expiring_medicines(
    conn: &Connection,
    patient_id: &Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT {MEDICINE_COLUMNS}
         FROM medicines m
         JOIN medicine_schedules ms ON ms.medicine_id = m.id
         WHERE ms.patient_id = ?1
           AND m.expires_on IS NOT NULL
           AND m.expires_on >= ?2
           AND m.expires_on <= ?3
         ORDER BY m.expires_on"
    ))?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), from.to_string(), until.to_string()],
        medicine_row_from_rusqlite,
    )?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row?)?);
    }
    Ok(meds)
}

struct MedicineRow {
    id: String,
    name: String,
    details: Option<String>,
    quantity: u32,
    stocked_on: String,
    expires_on: Option<String>,
    manufacturer: Option<String>,
    batch_no: Option<String>,
    storage: Option<String>,
    prescription_required: i32,
}

fn medicine_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicineRow, rusqlite::Error> {
    Ok(MedicineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        details: row.get(2)?,
        quantity: row.get(3)?,
        stocked_on: row.get(4)?,
        expires_on: row.get(5)?,
        manufacturer: row.get(6)?,
        batch_no: row.get(7)?,
        storage: row.get(8)?,
        prescription_required: row.get(9)?,
    })
}

fn medicine_from_row(row: MedicineRow) -> Result<Medicine, DatabaseError> {
    Ok(Medicine {
        id: parse_uuid(&row.id)?,
        name: row.name,
        details: row.details,
        quantity: row.quantity,
        stocked_on: parse_date(&row.stocked_on)?,
        expires_on: row.expires_on.as_deref().map(parse_date).transpose()?,
        manufacturer: row.manufacturer,
        batch_no: row.batch_no,
        storage: row.storage,
        prescription_required: row.prescription_required != 0,
    })
}
