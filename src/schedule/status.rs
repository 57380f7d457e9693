//! Dose status state machine and read-time classification.
//!
//! Only `scheduled`, `taken` and `skipped` are ever written. Whether a
//! scheduled dose is upcoming, due or missed depends on the clock, so it is
//! computed whenever a log is read.

use chrono::{Duration, NaiveDateTime};

use super::ScheduleError;
use crate::models::enums::{DoseDisplay, LogStatus};

/// Display classification of a log at `now`.
///
/// A scheduled dose is upcoming while its time is in the future, due from
/// its time until `missed_after` has elapsed, and missed strictly after that.
pub fn classify(
    status: LogStatus,
    scheduled_time: NaiveDateTime,
    now: NaiveDateTime,
    missed_after: Duration,
) -> DoseDisplay {
    match status {
        LogStatus::Taken => DoseDisplay::Taken,
        LogStatus::Skipped => DoseDisplay::Skipped,
        LogStatus::Missed => DoseDisplay::Missed,
        LogStatus::Scheduled if scheduled_time > now => DoseDisplay::Upcoming,
        LogStatus::Scheduled if scheduled_time < now - missed_after => DoseDisplay::Missed,
        LogStatus::Scheduled => DoseDisplay::DueNow,
    }
}

/// Stored status with the time-based `missed` transition applied.
pub fn effective_status(
    status: LogStatus,
    scheduled_time: NaiveDateTime,
    now: NaiveDateTime,
    missed_after: Duration,
) -> LogStatus {
    match classify(status, scheduled_time, now, missed_after) {
        DoseDisplay::Missed => LogStatus::Missed,
        _ => status,
    }
}

/// Check that a patient action may move a log from `current` (its effective
/// status) to `target`. Only `taken` and `skipped` are patient actions, and
/// only an open `scheduled` dose accepts one.
pub fn check_transition(current: LogStatus, target: LogStatus) -> Result<(), ScheduleError> {
    if !matches!(target, LogStatus::Taken | LogStatus::Skipped) {
        return Err(ScheduleError::Validation(format!(
            "a dose can only be marked taken or skipped, not {target}"
        )));
    }
    if current.is_terminal() {
        return Err(ScheduleError::InvalidTransition {
            from: current,
            to: target,
        });
    }
    Ok(())
}
