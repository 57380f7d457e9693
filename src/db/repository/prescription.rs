use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Prescription, PrescriptionListing};

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, doctor_id, prescription_date, notes, file_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            rx.id.to_string(),
            rx.patient_id.to_string(),
            rx.doctor_id.map(|id| id.to_string()),
            rx.prescription_date.to_string(),
            rx.notes,
            rx.file_path,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, doctor_id, prescription_date, notes, file_path
             FROM prescriptions WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, patient_id, doctor_id, date, notes, file_path)| {
        Ok(Prescription {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            doctor_id: doctor_id.as_deref().map(parse_uuid).transpose()?,
            prescription_date: parse_date(&date)?,
            notes,
            file_path,
        })
    })
    .transpose()
}

/// A patient's prescriptions, newest first, with the doctor's full name.
pub fn get_prescriptions_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<PrescriptionListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.patient_id, p.doctor_id, p.prescription_date, p.notes, p.file_path,
                d.full_name
         FROM prescriptions p
         LEFT JOIN users d ON d.id = p.doctor_id
         WHERE p.patient_id = ?1
         ORDER BY p.prescription_date DESC, p.created_at DESC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut listings = Vec::new();
    for row in rows {
        let (id, patient_id, doctor_id, date, notes, file_path, doctor_name) = row?;
        listings.push(PrescriptionListing {
            prescription: Prescription {
                id: parse_uuid(&id)?,
                patient_id: parse_uuid(&patient_id)?,
                doctor_id: doctor_id.as_deref().map(parse_uuid).transpose()?,
                prescription_date: parse_date(&date)?,
                notes,
                file_path,
            },
            doctor_name,
        });
    }
    Ok(listings)
}

pub fn delete_prescription(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM prescriptions WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Prescription", id));
    }
    Ok(())
}
