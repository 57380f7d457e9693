use std::path::PathBuf;

use chrono::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedSched";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Days ahead of the anchor date that dose logs are materialized for.
pub const LOG_WINDOW_DAYS: i64 = 7;

/// A scheduled dose older than this with no patient action reads as missed.
pub const MISSED_AFTER_MINUTES: i64 = 60;

/// How long SQLite keeps retrying a locked database before failing the call.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default window for the expiring-medicine warning on the patient agenda.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Get the application data directory
/// ~/MedSched/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the clinic database file
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Directory holding copies of uploaded prescription files
pub fn prescriptions_dir() -> PathBuf {
    app_data_dir().join("prescriptions")
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medsched=info,medsched_lib=info"
}

/// Tunables for the schedule log engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Forward window, in days, materialized from an anchor date.
    pub window_days: i64,
    /// Grace period after the scheduled time before a dose reads as missed.
    pub missed_after: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: LOG_WINDOW_DAYS,
            missed_after: Duration::minutes(MISSED_AFTER_MINUTES),
        }
    }
}
