//! Read-side views over a patient's schedules and dose logs.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use super::status::classify;
use crate::db::repository::{dose_log_from_row, dose_log_row_from_rusqlite, parse_uuid};
use crate::db::{self, DatabaseError};
use crate::models::enums::{DoseDisplay, LogStatus, UserType};
use crate::models::Schedule;

/// One dose on a patient's agenda.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaEntry {
    pub log_id: Uuid,
    pub schedule_id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub scheduled_time: NaiveDateTime,
    pub taken_time: Option<NaiveDateTime>,
    /// Stored status.
    pub status: LogStatus,
    /// Status as of the `now` the agenda was built with.
    pub display: DoseDisplay,
    pub notes: Option<String>,
}

/// A schedule with its medicine's name, for listing.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub medicine_name: String,
}

/// A patient's doses scheduled on dates in [from, to], earliest first.
pub fn patient_agenda(
    conn: &Connection,
    patient_id: &Uuid,
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
    missed_after: Duration,
) -> Result<Vec<AgendaEntry>, DatabaseError> {
    db::require_user_type(conn, patient_id, UserType::Patient)?;
    let mut stmt = conn.prepare(
        "SELECT ml.id, ml.schedule_id, ml.scheduled_time, ml.taken_time, ml.status, ml.notes,
                ms.medicine_id, m.name, ms.dosage
         FROM medicine_logs ml
         JOIN medicine_schedules ms ON ms.id = ml.schedule_id
         JOIN medicines m ON m.id = ms.medicine_id
         WHERE ms.patient_id = ?1
           AND date(ml.scheduled_time) BETWEEN ?2 AND ?3
         ORDER BY ml.scheduled_time, m.name",
    )?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), from.to_string(), to.to_string()],
        |row| {
            let log = dose_log_row_from_rusqlite(row)?;
            let medicine_id: String = row.get(6)?;
            let medicine_name: String = row.get(7)?;
            let dosage: String = row.get(8)?;
            Ok((log, medicine_id, medicine_name, dosage))
        },
    )?;

    let mut entries = Vec::new();
    for row in rows {
        let (log_row, medicine_id, medicine_name, dosage) = row?;
        let log = dose_log_from_row(log_row)?;
        entries.push(AgendaEntry {
            log_id: log.id,
            schedule_id: log.schedule_id,
            medicine_id: parse_uuid(&medicine_id)?,
            medicine_name,
            dosage,
            scheduled_time: log.scheduled_time,
            taken_time: log.taken_time,
            status: log.status,
            display: classify(log.status, log.scheduled_time, now, missed_after),
            notes: log.notes,
        });
    }
    Ok(entries)
}

/// A patient's schedules with medicine names, newest start date first.
pub fn patient_schedules(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<ScheduleSummary>, DatabaseError> {
    db::require_user_type(conn, patient_id, UserType::Patient)?;
    let mut summaries = Vec::new();
    for schedule in db::list_schedules(conn, Some(patient_id), None)? {
        let medicine = db::get_medicine(conn, &schedule.medicine_id)?
            .ok_or_else(|| DatabaseError::not_found("Medicine", schedule.medicine_id))?;
        summaries.push(ScheduleSummary {
            schedule,
            medicine_name: medicine.name,
        });
    }
    Ok(summaries)
}
