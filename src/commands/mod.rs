pub mod agenda;
pub mod records;
pub mod schedules;
pub mod state;

use uuid::Uuid;

/// Health check command. Verifies the clinic database can be opened.
pub fn health_check(state: &state::AppState) -> String {
    tracing::debug!("Health check called");
    match state.open_db() {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("database unavailable: {e}"),
    }
}

/// Parse an id argument, reporting failures the way every command does.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("Invalid ID '{raw}': {e}"))
}
