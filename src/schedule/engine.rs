//! Log generation, regeneration, cascade deletion and patient actions.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use super::status::{check_transition, classify, effective_status};
use super::store::ScheduleStore;
use super::time_slots::parse_time_slots;
use super::ScheduleError;
use crate::config::EngineConfig;
use crate::models::enums::{DoseDisplay, LogStatus};
use crate::models::{DoseLog, Schedule, ScheduleInput};

/// Counts reported by a delete-then-regenerate pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Regeneration {
    pub removed: usize,
    pub created: usize,
}

/// Schedule log engine over an injected store.
///
/// Every public operation runs in a single store transaction. Operations that
/// depend on the clock take `today` / `now` from the caller.
pub struct ScheduleEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: ScheduleStore> ScheduleEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Create the logs of `schedule` for one date.
    ///
    /// A date outside the schedule's [start, end] window, or one that already
    /// has any log for this schedule, produces nothing. Returns the new logs.
    pub fn generate(
        &self,
        schedule: &Schedule,
        for_date: NaiveDate,
    ) -> Result<Vec<DoseLog>, ScheduleError> {
        self.store.transaction(|store| {
            require_schedule(store, &schedule.id)?;
            generate_day(store, schedule, for_date)
        })
    }

    /// Materialize every date in [anchor, anchor + window] that the schedule
    /// covers. Returns the number of logs created.
    pub fn generate_for_window(
        &self,
        schedule: &Schedule,
        anchor: NaiveDate,
    ) -> Result<usize, ScheduleError> {
        self.store.transaction(|store| {
            require_schedule(store, &schedule.id)?;
            generate_window(store, schedule, anchor, self.config.window_days)
        })
    }

    /// Materialize the window for every schedule active on `anchor`,
    /// optionally restricted to one patient.
    pub fn materialize_active(
        &self,
        patient_id: Option<&Uuid>,
        anchor: NaiveDate,
    ) -> Result<usize, ScheduleError> {
        let created = self.store.transaction(|store| {
            let mut created = 0;
            for schedule in store.list_schedules(patient_id, Some(anchor))? {
                created += generate_window(store, &schedule, anchor, self.config.window_days)?;
            }
            Ok(created)
        })?;

        tracing::info!(
            patient_id = ?patient_id,
            anchor = %anchor,
            created,
            "Materialized dose logs for active schedules"
        );
        Ok(created)
    }

    /// Validate and persist a new schedule, then materialize its window
    /// anchored at `today`.
    pub fn create_schedule(
        &self,
        input: &ScheduleInput,
        today: NaiveDate,
    ) -> Result<Schedule, ScheduleError> {
        let schedule = build_schedule(Uuid::new_v4(), input)?;

        let created = self.store.transaction(|store| {
            store.insert_schedule(&schedule)?;
            generate_window(store, &schedule, today, self.config.window_days)
        })?;

        tracing::info!(
            schedule_id = %schedule.id,
            patient_id = %schedule.patient_id,
            logs = created,
            "Schedule created"
        );
        Ok(schedule)
    }

    /// Replace a schedule's fields and regenerate its logs from the new start
    /// date. The patient of an existing schedule never changes.
    pub fn edit_schedule(
        &self,
        schedule_id: &Uuid,
        input: &ScheduleInput,
        today: NaiveDate,
    ) -> Result<Schedule, ScheduleError> {
        let mut edited = build_schedule(*schedule_id, input)?;

        let regeneration = self.store.transaction(|store| {
            let existing = require_schedule(store, schedule_id)?;
            edited.patient_id = existing.patient_id;
            store.update_schedule(&edited)?;
            regenerate(
                store,
                &edited,
                edited.start_date,
                edited.end_date,
                today,
                self.config.window_days,
            )
        })?;

        tracing::info!(
            schedule_id = %schedule_id,
            removed = regeneration.removed,
            created = regeneration.created,
            "Schedule edited"
        );
        Ok(edited)
    }

    /// Move a schedule to [new_start, new_end]: store the new dates, drop the
    /// logs dated on/after `new_start`, then regenerate every covered date
    /// from `new_start` through `today + window`. Logs before `new_start`
    /// are kept as history.
    pub fn regenerate_after_edit(
        &self,
        schedule: &Schedule,
        new_start: NaiveDate,
        new_end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Regeneration, ScheduleError> {
        validate_range(new_start, new_end)?;
        let regeneration = self.store.transaction(|store| {
            let stored = require_schedule(store, &schedule.id)?;
            let moved = Schedule {
                start_date: new_start,
                end_date: new_end,
                ..stored
            };
            store.update_schedule(&moved)?;
            regenerate(store, &moved, new_start, new_end, today, self.config.window_days)
        })?;

        tracing::info!(
            schedule_id = %schedule.id,
            removed = regeneration.removed,
            created = regeneration.created,
            "Schedule dates moved"
        );
        Ok(regeneration)
    }

    /// Delete all of a schedule's logs and then the schedule itself.
    /// Returns the number of logs removed.
    pub fn delete_schedule_cascade(&self, schedule_id: &Uuid) -> Result<usize, ScheduleError> {
        let removed = self.store.transaction(|store| {
            let removed = store.delete_logs(schedule_id, None)?;
            store.delete_schedule(schedule_id)?;
            Ok(removed)
        })?;

        tracing::info!(schedule_id = %schedule_id, logs = removed, "Schedule cascade-deleted");
        Ok(removed)
    }

    /// Record a patient action (`taken` or `skipped`) on an open dose.
    pub fn mark(
        &self,
        log_id: &Uuid,
        target: LogStatus,
        now: NaiveDateTime,
        notes: Option<&str>,
    ) -> Result<DoseLog, ScheduleError> {
        let log = self.store.transaction(|store| {
            let mut log = store.find_log(log_id)?.ok_or_else(|| {
                ScheduleError::Referential(format!("Dose log not found: {log_id}"))
            })?;

            let current =
                effective_status(log.status, log.scheduled_time, now, self.config.missed_after);
            check_transition(current, target)?;

            let taken_time = (target == LogStatus::Taken).then_some(now);
            store.update_log(log_id, target, taken_time, notes)?;

            log.status = target;
            log.taken_time = taken_time;
            log.notes = notes.map(str::to_owned);
            Ok(log)
        })?;

        tracing::info!(log_id = %log_id, status = %target, "Dose marked");
        Ok(log)
    }

    /// Display classification of a log at `now`.
    pub fn display_status(&self, log: &DoseLog, now: NaiveDateTime) -> DoseDisplay {
        classify(log.status, log.scheduled_time, now, self.config.missed_after)
    }
}

/// Turn caller input into a validated schedule.
pub fn build_schedule(id: Uuid, input: &ScheduleInput) -> Result<Schedule, ScheduleError> {
    if input.dosage.trim().is_empty() {
        return Err(ScheduleError::Validation("dosage is required".into()));
    }
    if input.frequency.trim().is_empty() {
        return Err(ScheduleError::Validation("frequency is required".into()));
    }
    validate_range(input.start_date, input.end_date)?;
    let time_slots = parse_time_slots(&input.time_slots)?;

    Ok(Schedule {
        id,
        patient_id: input.patient_id,
        medicine_id: input.medicine_id,
        prescription_id: input.prescription_id,
        dosage: input.dosage.trim().to_owned(),
        frequency: input.frequency.trim().to_owned(),
        start_date: input.start_date,
        end_date: input.end_date,
        time_slots,
        notes: input.notes.clone().filter(|n| !n.trim().is_empty()),
    })
}

fn require_schedule<S: ScheduleStore>(store: &S, id: &Uuid) -> Result<Schedule, ScheduleError> {
    store
        .find_schedule(id)?
        .ok_or_else(|| ScheduleError::Referential(format!("Schedule not found: {id}")))
}

fn validate_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), ScheduleError> {
    match end {
        Some(end) if end < start => Err(ScheduleError::Validation(format!(
            "end date {end} is before start date {start}"
        ))),
        _ => Ok(()),
    }
}

fn generate_day<S: ScheduleStore>(
    store: &S,
    schedule: &Schedule,
    for_date: NaiveDate,
) -> Result<Vec<DoseLog>, ScheduleError> {
    if !schedule.covers(for_date) {
        tracing::debug!(schedule_id = %schedule.id, date = %for_date, "Date outside schedule");
        return Ok(Vec::new());
    }
    if store.count_logs(&schedule.id, for_date)? > 0 {
        tracing::debug!(schedule_id = %schedule.id, date = %for_date, "Logs already generated");
        return Ok(Vec::new());
    }

    let mut logs = Vec::new();
    for slot in schedule.distinct_slots() {
        let scheduled_time = slot.on(for_date);
        let id = store.insert_log(&schedule.id, scheduled_time, LogStatus::Scheduled)?;
        logs.push(DoseLog {
            id,
            schedule_id: schedule.id,
            scheduled_time,
            taken_time: None,
            status: LogStatus::Scheduled,
            notes: None,
        });
    }
    Ok(logs)
}

fn generate_range<S: ScheduleStore>(
    store: &S,
    schedule: &Schedule,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<usize, ScheduleError> {
    let mut created = 0;
    for date in first.iter_days().take_while(|d| *d <= last) {
        created += generate_day(store, schedule, date)?.len();
    }
    Ok(created)
}

fn window_end(anchor: NaiveDate, window_days: i64) -> NaiveDate {
    anchor
        .checked_add_signed(Duration::days(window_days))
        .unwrap_or(NaiveDate::MAX)
}

fn generate_window<S: ScheduleStore>(
    store: &S,
    schedule: &Schedule,
    anchor: NaiveDate,
    window_days: i64,
) -> Result<usize, ScheduleError> {
    let bound = window_end(anchor, window_days);
    let first = schedule.start_date.max(anchor);
    let last = schedule.end_date.map_or(bound, |end| end.min(bound));
    generate_range(store, schedule, first, last)
}

fn regenerate<S: ScheduleStore>(
    store: &S,
    schedule: &Schedule,
    new_start: NaiveDate,
    new_end: Option<NaiveDate>,
    today: NaiveDate,
    window_days: i64,
) -> Result<Regeneration, ScheduleError> {
    let removed = store.delete_logs(&schedule.id, Some(new_start))?;

    let edited = Schedule {
        start_date: new_start,
        end_date: new_end,
        ..schedule.clone()
    };
    let bound = window_end(today, window_days);
    let last = new_end.map_or(bound, |end| end.min(bound));
    let created = generate_range(store, &edited, new_start, last)?;

    Ok(Regeneration { removed, created })
}
