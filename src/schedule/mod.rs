//! Schedule log engine.
//!
//! Expands recurring intake schedules into dated dose logs inside a rolling
//! forward window, keeps those logs in step with schedule edits and
//! deletions, and derives each log's status relative to "now".

mod agenda;
mod engine;
mod status;
mod store;
mod time_slots;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::enums::LogStatus;

// ═══════════════════════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Referential(String),

    #[error("Cannot mark a {from} dose as {to}")]
    InvalidTransition { from: LogStatus, to: LogStatus },

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for ScheduleError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound { .. } => ScheduleError::Referential(e.to_string()),
            other => ScheduleError::Database(other),
        }
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(e: rusqlite::Error) -> Self {
        ScheduleError::Database(DatabaseError::Sqlite(e))
    }
}

impl From<InvalidTimeSlot> for ScheduleError {
    fn from(e: InvalidTimeSlot) -> Self {
        ScheduleError::Validation(e.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use agenda::*;
pub use engine::*;
pub use status::*;
pub use store::*;
pub use time_slots::*;
