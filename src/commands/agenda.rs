//! Patient agenda commands.

use chrono::{Duration, Local, NaiveDate};

use super::parse_id;
use super::state::AppState;
use crate::config;
use crate::models::Medicine;
use crate::records;
use crate::schedule::{self, AgendaEntry, ScheduleEngine, SqliteStore};

/// A patient's doses for `date` (YYYY-MM-DD), or for today through the end
/// of the log window when no date is given. Materializes the patient's
/// window first so the agenda never shows a gap.
pub fn get_patient_agenda(
    patient_id: String,
    date: Option<String>,
    state: &AppState,
) -> Result<Vec<AgendaEntry>, String> {
    let id = parse_id(&patient_id)?;
    let (from, to) = match date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date format (expected YYYY-MM-DD): {raw}"))?;
            (day, day)
        }
        None => {
            let today = Local::now().date_naive();
            (today, today + Duration::days(state.engine.window_days))
        }
    };

    let conn = state.open_db().map_err(|e| e.to_string())?;
    let now = Local::now().naive_local();
    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine
        .materialize_active(Some(&id), now.date())
        .map_err(|e| e.to_string())?;

    schedule::patient_agenda(&conn, &id, from, to, now, state.engine.missed_after)
        .map_err(|e| e.to_string())
}

/// Medicines on the patient's schedules expiring within the warning window.
pub fn get_expiring_medicines(
    patient_id: String,
    state: &AppState,
) -> Result<Vec<Medicine>, String> {
    let id = parse_id(&patient_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::expiring_medicines(
        &conn,
        &id,
        Local::now().date_naive(),
        config::EXPIRY_WARNING_DAYS,
    )
    .map_err(|e| e.to_string())
}
