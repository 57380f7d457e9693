//! Persistence seam for the engine.
//!
//! The engine only talks to storage through `ScheduleStore`, so it can be
//! driven by any backend. `SqliteStore` is the production implementation.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use super::ScheduleError;
use crate::db::{self, DatabaseError};
use crate::models::enums::{LogStatus, UserType};
use crate::models::{DoseLog, Schedule};

/// Storage operations consumed by the schedule log engine.
pub trait ScheduleStore {
    fn find_schedule(&self, id: &Uuid) -> Result<Option<Schedule>, DatabaseError>;

    /// Schedules filtered by patient and/or by being active on a date.
    fn list_schedules(
        &self,
        patient_id: Option<&Uuid>,
        active_on: Option<NaiveDate>,
    ) -> Result<Vec<Schedule>, DatabaseError>;

    /// Persist a new schedule. Fails with `NotFound` when the patient,
    /// medicine or prescription it references does not exist.
    fn insert_schedule(&self, schedule: &Schedule) -> Result<(), DatabaseError>;

    fn update_schedule(&self, schedule: &Schedule) -> Result<(), DatabaseError>;

    fn delete_schedule(&self, id: &Uuid) -> Result<(), DatabaseError>;

    /// Logs of a schedule whose scheduled time falls on `date`.
    fn count_logs(&self, schedule_id: &Uuid, date: NaiveDate) -> Result<u32, DatabaseError>;

    fn insert_log(
        &self,
        schedule_id: &Uuid,
        scheduled_time: NaiveDateTime,
        status: LogStatus,
    ) -> Result<Uuid, DatabaseError>;

    fn find_log(&self, id: &Uuid) -> Result<Option<DoseLog>, DatabaseError>;

    /// Delete all logs of a schedule, or only those dated on/after `from`.
    fn delete_logs(
        &self,
        schedule_id: &Uuid,
        from: Option<NaiveDate>,
    ) -> Result<usize, DatabaseError>;

    fn update_log(
        &self,
        log_id: &Uuid,
        status: LogStatus,
        taken_time: Option<NaiveDateTime>,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError>;

    /// Run `work` atomically: every write it makes is committed together, or
    /// none is when it returns an error.
    fn transaction<T, F>(&self, work: F) -> Result<T, ScheduleError>
    where
        F: FnOnce(&Self) -> Result<T, ScheduleError>,
        Self: Sized;
}

/// `ScheduleStore` over a borrowed SQLite connection.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn check_references(&self, schedule: &Schedule) -> Result<(), DatabaseError> {
        db::require_user_type(self.conn, &schedule.patient_id, UserType::Patient)?;
        if db::get_medicine(self.conn, &schedule.medicine_id)?.is_none() {
            return Err(DatabaseError::not_found("Medicine", schedule.medicine_id));
        }
        if let Some(rx_id) = schedule.prescription_id {
            if db::get_prescription(self.conn, &rx_id)?.is_none() {
                return Err(DatabaseError::not_found("Prescription", rx_id));
            }
        }
        Ok(())
    }
}

impl ScheduleStore for SqliteStore<'_> {
    fn find_schedule(&self, id: &Uuid) -> Result<Option<Schedule>, DatabaseError> {
        db::get_schedule(self.conn, id)
    }

    fn list_schedules(
        &self,
        patient_id: Option<&Uuid>,
        active_on: Option<NaiveDate>,
    ) -> Result<Vec<Schedule>, DatabaseError> {
        db::list_schedules(self.conn, patient_id, active_on)
    }

    fn insert_schedule(&self, schedule: &Schedule) -> Result<(), DatabaseError> {
        self.check_references(schedule)?;
        db::insert_schedule(self.conn, schedule)
    }

    fn update_schedule(&self, schedule: &Schedule) -> Result<(), DatabaseError> {
        self.check_references(schedule)?;
        db::update_schedule(self.conn, schedule)
    }

    fn delete_schedule(&self, id: &Uuid) -> Result<(), DatabaseError> {
        db::delete_schedule(self.conn, id)
    }

    fn count_logs(&self, schedule_id: &Uuid, date: NaiveDate) -> Result<u32, DatabaseError> {
        db::count_dose_logs_on(self.conn, schedule_id, date)
    }

    fn insert_log(
        &self,
        schedule_id: &Uuid,
        scheduled_time: NaiveDateTime,
        status: LogStatus,
    ) -> Result<Uuid, DatabaseError> {
        db::insert_dose_log(self.conn, schedule_id, scheduled_time, status)
    }

    fn find_log(&self, id: &Uuid) -> Result<Option<DoseLog>, DatabaseError> {
        db::get_dose_log(self.conn, id)
    }

    fn delete_logs(
        &self,
        schedule_id: &Uuid,
        from: Option<NaiveDate>,
    ) -> Result<usize, DatabaseError> {
        db::delete_dose_logs(self.conn, schedule_id, from)
    }

    fn update_log(
        &self,
        log_id: &Uuid,
        status: LogStatus,
        taken_time: Option<NaiveDateTime>,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError> {
        db::update_dose_log(self.conn, log_id, status, taken_time, notes)
    }

    fn transaction<T, F>(&self, work: F) -> Result<T, ScheduleError>
    where
        F: FnOnce(&Self) -> Result<T, ScheduleError>,
    {
        // Statements issued through `self.conn` run inside the transaction
        // until it is committed; dropping it uncommitted rolls back.
        let tx = self.conn.unchecked_transaction()?;
        let out = work(self)?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Medicine, TimeSlot, User};

    fn seeded() -> (Connection, Schedule) {
        let conn = open_memory_database().unwrap();
        let patient_id = Uuid::new_v4();
        db::insert_user(&conn, &User {
            id: patient_id,
            username: "patient1".into(),
            email: None,
            full_name: "John Smith".into(),
            user_type: UserType::Patient,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        })
        .unwrap();
        let medicine_id = Uuid::new_v4();
        db::insert_medicine(&conn, &Medicine {
            id: medicine_id,
            name: "Paracetamol 500mg".into(),
            details: None,
            quantity: 100,
            stocked_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expires_on: None,
            manufacturer: None,
            batch_no: None,
            storage: None,
            prescription_required: false,
        })
        .unwrap();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            patient_id,
            medicine_id,
            prescription_id: None,
            dosage: "1 tablet".into(),
            frequency: "daily".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: None,
            time_slots: vec![TimeSlot::new(8, 0).unwrap()],
            notes: None,
        };
        (conn, schedule)
    }

    #[test]
    fn insert_schedule_checks_patient_reference() {
        let (conn, mut schedule) = seeded();
        schedule.patient_id = Uuid::new_v4();
        let err = SqliteStore::new(&conn).insert_schedule(&schedule).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity_type, .. } if entity_type == "Patient"));
    }

    #[test]
    fn insert_schedule_checks_medicine_and_prescription() {
        let (conn, schedule) = seeded();
        let store = SqliteStore::new(&conn);

        let missing_med = Schedule { medicine_id: Uuid::new_v4(), ..schedule.clone() };
        assert!(matches!(
            store.insert_schedule(&missing_med),
            Err(DatabaseError::NotFound { ref entity_type, .. }) if entity_type == "Medicine"
        ));

        let missing_rx = Schedule { prescription_id: Some(Uuid::new_v4()), ..schedule };
        assert!(matches!(
            store.insert_schedule(&missing_rx),
            Err(DatabaseError::NotFound { ref entity_type, .. }) if entity_type == "Prescription"
        ));
    }

    #[test]
    fn transaction_commits_on_success() {
        let (conn, schedule) = seeded();
        let store = SqliteStore::new(&conn);
        store.insert_schedule(&schedule).unwrap();
        let time = schedule.start_date.and_hms_opt(8, 0, 0).unwrap();

        store
            .transaction(|s| Ok(s.insert_log(&schedule.id, time, LogStatus::Scheduled)?))
            .unwrap();

        assert_eq!(store.count_logs(&schedule.id, schedule.start_date).unwrap(), 1);
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let (conn, schedule) = seeded();
        let store = SqliteStore::new(&conn);
        store.insert_schedule(&schedule).unwrap();
        let time = schedule.start_date.and_hms_opt(8, 0, 0).unwrap();

        let result: Result<(), ScheduleError> = store.transaction(|s| {
            s.insert_log(&schedule.id, time, LogStatus::Scheduled)?;
            Err(ScheduleError::Validation("abort".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.count_logs(&schedule.id, schedule.start_date).unwrap(), 0);
    }
}
