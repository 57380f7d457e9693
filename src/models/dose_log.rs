use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::LogStatus;

/// One dose event: a schedule, a calendar date and one of its time slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLog {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub scheduled_time: NaiveDateTime,
    pub taken_time: Option<NaiveDateTime>,
    /// Stored status. Use `schedule::effective_status` for what a reader sees.
    pub status: LogStatus,
    pub notes: Option<String>,
}
