pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod records;
pub mod schedule;

use chrono::Local;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::commands::state::AppState;
use crate::models::enums::UserType;
use crate::schedule::{AgendaEntry, ScheduleEngine, SqliteStore};

/// Today's agenda for one patient, as printed by the binary.
#[derive(Debug, Serialize)]
pub struct PatientAgenda {
    pub patient: String,
    pub doses: Vec<AgendaEntry>,
}

pub fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let state = AppState::new();
    let agendas = daily_agendas(&state)?;
    let json = serde_json::to_string_pretty(&agendas).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Seed an empty database, materialize every active schedule's window and
/// collect today's agenda for each patient.
pub fn daily_agendas(state: &AppState) -> Result<Vec<PatientAgenda>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    let now = Local::now().naive_local();
    let today = now.date();

    db::seed::seed_if_empty(&conn, now).map_err(|e| e.to_string())?;

    let engine = ScheduleEngine::new(SqliteStore::new(&conn), state.engine);
    engine
        .materialize_active(None, today)
        .map_err(|e| e.to_string())?;

    let mut agendas = Vec::new();
    for patient in db::get_users_by_type(&conn, UserType::Patient).map_err(|e| e.to_string())? {
        let doses = schedule::patient_agenda(
            &conn,
            &patient.id,
            today,
            today,
            now,
            state.engine.missed_after,
        )
        .map_err(|e| e.to_string())?;
        agendas.push(PatientAgenda {
            patient: patient.full_name,
            doses,
        });
    }
    Ok(agendas)
}
