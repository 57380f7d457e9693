use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time of day at which a dose is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    /// Returns `None` unless `hour <= 23` and `minute <= 59`.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Combine with a calendar date into a scheduled timestamp.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A recurring intake plan for one medicine and one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medicine_id: Uuid,
    pub prescription_id: Option<Uuid>,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    /// Inclusive; `None` means ongoing.
    pub end_date: Option<NaiveDate>,
    /// As entered: order and duplicates preserved.
    pub time_slots: Vec<TimeSlot>,
    pub notes: Option<String>,
}

impl Schedule {
    /// Whether `date` falls inside [start_date, end_date].
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Distinct slots in first-entered order.
    pub fn distinct_slots(&self) -> Vec<TimeSlot> {
        let mut seen = Vec::with_capacity(self.time_slots.len());
        for slot in &self.time_slots {
            if !seen.contains(slot) {
                seen.push(*slot);
            }
        }
        seen
    }
}

/// Caller input for creating or editing a schedule. Time slots arrive in
/// their `HH:MM,HH:MM` serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub patient_id: Uuid,
    pub medicine_id: Uuid,
    pub prescription_id: Option<Uuid>,
    pub dosage: String,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub time_slots: String,
    pub notes: Option<String>,
}
