//! `HH:MM,HH:MM` serialization of a schedule's daily time slots.

use thiserror::Error;

use crate::models::TimeSlot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid time slot '{token}': {reason}")]
pub struct InvalidTimeSlot {
    pub token: String,
    pub reason: &'static str,
}

impl InvalidTimeSlot {
    fn new(token: &str, reason: &'static str) -> Self {
        Self {
            token: token.into(),
            reason,
        }
    }
}

/// Parse one `H:M` / `HH:MM` token. Zero padding is optional; signs,
/// whitespace inside the token and extra colons are not accepted.
pub fn parse_time_slot(token: &str) -> Result<TimeSlot, InvalidTimeSlot> {
    let token = token.trim();
    let mut parts = token.split(':');
    let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InvalidTimeSlot::new(token, "expected exactly one ':' between hour and minute"));
    };

    let hour = parse_component(hour)
        .ok_or_else(|| InvalidTimeSlot::new(token, "hour is not a number"))?;
    let minute =
        parse_component(minute)
            .ok_or_else(|| InvalidTimeSlot::new(token, "minute is not a number"))?;

    if hour > 23 {
        return Err(InvalidTimeSlot::new(token, "hour must be between 0 and 23"));
    }
    TimeSlot::new(hour, minute)
        .ok_or_else(|| InvalidTimeSlot::new(token, "minute must be between 0 and 59"))
}

fn parse_component(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a comma-separated slot list, keeping order and duplicates.
pub fn parse_time_slots(raw: &str) -> Result<Vec<TimeSlot>, InvalidTimeSlot> {
    if raw.trim().is_empty() {
        return Err(InvalidTimeSlot::new(raw, "at least one time slot is required"));
    }
    raw.split(',').map(parse_time_slot).collect()
}

/// Canonical zero-padded form, e.g. `08:00,14:00,20:00`.
pub fn format_time_slots(slots: &[TimeSlot]) -> String {
    slots
        .iter()
        .map(TimeSlot::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
