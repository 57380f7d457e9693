use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Schedule;
use crate::schedule::{format_time_slots, parse_time_slots};

const SCHEDULE_COLUMNS: &str = "id, patient_id, medicine_id, prescription_id, dosage, frequency,
     start_date, end_date, time_slots, notes";

pub fn insert_schedule(conn: &Connection, schedule: &Schedule) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicine_schedules (id, patient_id, medicine_id, prescription_id, dosage,
         frequency, start_date, end_date, time_slots, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            schedule.id.to_string(),
            schedule.patient_id.to_string(),
            schedule.medicine_id.to_string(),
            schedule.prescription_id.map(|id| id.to_string()),
            schedule.dosage,
            schedule.frequency,
            schedule.start_date.to_string(),
            schedule.end_date.map(|d| d.to_string()),
            format_time_slots(&schedule.time_slots),
            schedule.notes,
        ],
    )?;
    Ok(())
}

pub fn get_schedule(conn: &Connection, id: &Uuid) -> Result<Option<Schedule>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {SCHEDULE_COLUMNS} FROM medicine_schedules WHERE id = ?1"),
            params![id.to_string()],
            schedule_row_from_rusqlite,
        )
        .optional()?;
    row.map(schedule_from_row).transpose()
}

/// Schedules filtered by patient and/or by containing `active_on` in their
/// [start_date, end_date] window. Newest start date first.
pub fn list_schedules(
    conn: &Connection,
    patient_id: Option<&Uuid>,
    active_on: Option<NaiveDate>,
) -> Result<Vec<Schedule>, DatabaseError> {
    let mut sql = format!("SELECT {SCHEDULE_COLUMNS} FROM medicine_schedules WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(patient_id) = patient_id {
        params_vec.push(Box::new(patient_id.to_string()));
        sql.push_str(&format!(" AND patient_id = ?{}", params_vec.len()));
    }

    if let Some(date) = active_on {
        params_vec.push(Box::new(date.to_string()));
        let p = params_vec.len();
        sql.push_str(&format!(
            " AND start_date <= ?{p} AND (end_date IS NULL OR end_date >= ?{p})"
        ));
    }

    sql.push_str(" ORDER BY start_date DESC, created_at DESC");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), schedule_row_from_rusqlite)?;

    let mut schedules = Vec::new();
    for row in rows {
        schedules.push(schedule_from_row(row?)?);
    }
    Ok(schedules)
}

/// Overwrite the editable fields of an existing schedule.
pub fn update_schedule(conn: &Connection, schedule: &Schedule) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicine_schedules
         SET medicine_id = ?1, prescription_id = ?2, dosage = ?3, frequency = ?4,
             start_date = ?5, end_date = ?6, time_slots = ?7, notes = ?8,
             updated_at = datetime('now')
         WHERE id = ?9",
        params![
            schedule.medicine_id.to_string(),
            schedule.prescription_id.map(|id| id.to_string()),
            schedule.dosage,
            schedule.frequency,
            schedule.start_date.to_string(),
            schedule.end_date.map(|d| d.to_string()),
            format_time_slots(&schedule.time_slots),
            schedule.notes,
            schedule.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Schedule", schedule.id));
    }
    Ok(())
}

pub fn delete_schedule(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM medicine_schedules WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Schedule", id));
    }
    Ok(())
}

struct ScheduleRow {
    id: String,
    patient_id: String,
    medicine_id: String,
    prescription_id: Option<String>,
    dosage: String,
    frequency: String,
    start_date: String,
    end_date: Option<String>,
    time_slots: String,
    notes: Option<String>,
}

fn schedule_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ScheduleRow, rusqlite::Error> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        medicine_id: row.get(2)?,
        prescription_id: row.get(3)?,
        dosage: row.get(4)?,
        frequency: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        time_slots: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn schedule_from_row(row: ScheduleRow) -> Result<Schedule, DatabaseError> {
    Ok(Schedule {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        medicine_id: parse_uuid(&row.medicine_id)?,
        prescription_id: row.prescription_id.as_deref().map(parse_uuid).transpose()?,
        dosage: row.dosage,
        frequency: row.frequency,
        start_date: parse_date(&row.start_date)?,
        end_date: row.end_date.as_deref().map(parse_date).transpose()?,
        time_slots: parse_time_slots(&row.time_slots)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        notes: row.notes,
    })
}
