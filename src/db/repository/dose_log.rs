use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::db::{DatabaseError, DATETIME_FORMAT};
use crate::models::enums::LogStatus;
use crate::models::DoseLog;

pub fn insert_dose_log(
    conn: &Connection,
    schedule_id: &Uuid,
    scheduled_time: NaiveDateTime,
    status: LogStatus,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO medicine_logs (id, schedule_id, scheduled_time, status)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            id.to_string(),
            schedule_id.to_string(),
            scheduled_time.format(DATETIME_FORMAT).to_string(),
            status.as_str(),
        ],
    )?;
    Ok(id)
}

pub fn get_dose_log(conn: &Connection, id: &Uuid) -> Result<Option<DoseLog>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, schedule_id, scheduled_time, taken_time, status, notes
             FROM medicine_logs WHERE id = ?1",
            params![id.to_string()],
            dose_log_row_from_rusqlite,
        )
        .optional()?;
    row.map(dose_log_from_row).transpose()
}

/// Logs of one schedule in scheduled-time order.
pub fn get_dose_logs_for_schedule(
    conn: &Connection,
    schedule_id: &Uuid,
) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, schedule_id, scheduled_time, taken_time, status, notes
         FROM medicine_logs WHERE schedule_id = ?1
         ORDER BY scheduled_time",
    )?;
    let rows = stmt.query_map(params![schedule_id.to_string()], dose_log_row_from_rusqlite)?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(dose_log_from_row(row?)?);
    }
    Ok(logs)
}

/// Number of logs of a schedule whose scheduled time falls on `date`.
pub fn count_dose_logs_on(
    conn: &Connection,
    schedule_id: &Uuid,
    date: NaiveDate,
) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medicine_logs
         WHERE schedule_id = ?1 AND date(scheduled_time) = ?2",
        params![schedule_id.to_string(), date.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete a schedule's logs, all of them or only those dated on/after `from`.
pub fn delete_dose_logs(
    conn: &Connection,
    schedule_id: &Uuid,
    from: Option<NaiveDate>,
) -> Result<usize, DatabaseError> {
    let deleted = match from {
        Some(date) => conn.execute(
            "DELETE FROM medicine_logs
             WHERE schedule_id = ?1 AND date(scheduled_time) >= ?2",
            params![schedule_id.to_string(), date.to_string()],
        )?,
        None => conn.execute(
            "DELETE FROM medicine_logs WHERE schedule_id = ?1",
            params![schedule_id.to_string()],
        )?,
    };
    Ok(deleted)
}

pub fn update_dose_log(
    conn: &Connection,
    id: &Uuid,
    status: LogStatus,
    taken_time: Option<NaiveDateTime>,
    notes: Option<&str>,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicine_logs SET status = ?1, taken_time = ?2, notes = ?3 WHERE id = ?4",
        params![
            status.as_str(),
            taken_time.map(|t| t.format(DATETIME_FORMAT).to_string()),
            notes,
            id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("Dose log", id));
    }
    Ok(())
}

pub(crate) struct DoseLogRow {
    pub(crate) id: String,
    pub(crate) schedule_id: String,
    pub(crate) scheduled_time: String,
    pub(crate) taken_time: Option<String>,
    pub(crate) status: String,
    pub(crate) notes: Option<String>,
}

pub(crate) fn dose_log_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<DoseLogRow, rusqlite::Error> {
    Ok(DoseLogRow {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        scheduled_time: row.get(2)?,
        taken_time: row.get(3)?,
        status: row.get(4)?,
        notes: row.get(5)?,
    })
}

pub(crate) fn dose_log_from_row(row: DoseLogRow) -> Result<DoseLog, DatabaseError> {
    Ok(DoseLog {
        id: parse_uuid(&row.id)?,
        schedule_id: parse_uuid(&row.schedule_id)?,
        scheduled_time: parse_datetime(&row.scheduled_time)?,
        taken_time: row.taken_time.as_deref().map(parse_datetime).transpose()?,
        status: LogStatus::from_str(&row.status)?,
        notes: row.notes,
    })
}
