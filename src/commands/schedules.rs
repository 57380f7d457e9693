//! Schedule commands.
//!
//! - `create_schedule`: validate, persist and materialize the log window
//! - `edit_schedule`: replace fields and regenerate logs from the new start date
//! - `delete_schedule`: cascade-delete a schedule and its logs
//! - `mark_dose`: record `taken` / `skipped` on an open dose
//! - `list_patient_schedules`: a patient's schedules with medicine names

use std::str::FromStr;

use chrono::Local;

use super::parse_id;
use super::state::AppState;
use crate::models::enums::LogStatus;
use crate::models::{DoseLog, Schedule, ScheduleInput};
use crate::schedule::{self, ScheduleEngine, ScheduleSummary, SqliteStore};

pub fn create_schedule(input: ScheduleInput, state: &AppState) -> Result<Schedule, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine
        .create_schedule(&input, Local::now().date_naive())
        .map_err(|e| e.to_string())
}

pub fn edit_schedule(
    schedule_id: String,
    input: ScheduleInput,
    state: &AppState,
) -> Result<Schedule, String> {
    let id = parse_id(&schedule_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine
        .edit_schedule(&id, &input, Local::now().date_naive())
        .map_err(|e| e.to_string())
}

/// Returns the number of dose logs removed with the schedule.
pub fn delete_schedule(schedule_id: String, state: &AppState) -> Result<usize, String> {
    let id = parse_id(&schedule_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine.delete_schedule_cascade(&id).map_err(|e| e.to_string())
}

pub fn mark_dose(
    log_id: String,
    status: String,
    notes: Option<String>,
    state: &AppState,
) -> Result<DoseLog, String> {
    let id = parse_id(&log_id)?;
    let target = LogStatus::from_str(status.trim()).map_err(|e| e.to_string())?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine
        .mark(&id, target, Local::now().naive_local(), notes.as_deref())
        .map_err(|e| e.to_string())
}

pub fn list_patient_schedules(
    patient_id: String,
    state: &AppState,
) -> Result<Vec<ScheduleSummary>, String> {
    let id = parse_id(&patient_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    schedule::patient_schedules(&conn, &id).map_err(|e| e.to_string())
}
