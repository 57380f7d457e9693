use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::config::{self, EngineConfig};
use crate::db::{sqlite, DatabaseError};

/// Application state shared by every command.
/// Holds storage locations and engine tunables; each command opens its own
/// connection through `open_db`.
pub struct AppState {
    pub db_path: PathBuf,
    pub prescriptions_dir: PathBuf,
    pub engine: EngineConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_paths(config::database_path(), config::prescriptions_dir())
    }

    pub fn with_paths(db_path: PathBuf, prescriptions_dir: PathBuf) -> Self {
        Self {
            db_path,
            prescriptions_dir,
            engine: EngineConfig::default(),
        }
    }

    /// Open the clinic database, creating its directory on first use.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        sqlite::open_database(&self.db_path)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
