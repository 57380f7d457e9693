//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table; all public functions are re-exported here.

mod dose_log;
mod medicine;
mod prescription;
mod schedule;
mod user;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{DatabaseError, DATE_FORMAT, DATETIME_FORMAT};

pub use dose_log::*;
pub use medicine::*;
pub use prescription::*;
pub use schedule::*;
pub use user::*;

pub(crate) use dose_log::{dose_log_from_row, dose_log_row_from_rusqlite};

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date '{value}': {e}")))
}

pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, 0).unwrap()
    }

    fn make_user(conn: &Connection, username: &str, user_type: UserType) -> Uuid {
        let id = Uuid::new_v4();
        insert_user(conn, &User {
            id,
            username: username.into(),
            email: Some(format!("{username}@example.com")),
            full_name: format!("Full {username}"),
            user_type,
            created_at: at(date(2025, 1, 1), 9, 0),
        }).unwrap();
        id
    }

    fn make_medicine(conn: &Connection, name: &str, expires_on: Option<NaiveDate>) -> Uuid {
        let id = Uuid::new_v4();
        insert_medicine(conn, &Medicine {
            id,
            name: name.into(),
            details: None,
            quantity: 30,
            stocked_on: date(2025, 1, 1),
            expires_on,
            manufacturer: Some("Acme".into()),
            batch_no: None,
            storage: None,
            prescription_required: false,
        }).unwrap();
        id
    }

    fn make_schedule(
        conn: &Connection,
        patient_id: Uuid,
        medicine_id: Uuid,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Schedule {
        let schedule = Schedule {
            id: Uuid::new_v4(),
            patient_id,
            medicine_id,
            prescription_id: None,
            dosage: "1 tablet".into(),
            frequency: "twice daily".into(),
            start_date: start,
            end_date: end,
            time_slots: vec![TimeSlot::new(8, 0).unwrap(), TimeSlot::new(20, 0).unwrap()],
            notes: Some("after meals".into()),
        };
        insert_schedule(conn, &schedule).unwrap();
        schedule
    }

    #[test]
    fn user_insert_and_lookup_by_username() {
        let conn = test_db();
        let id = make_user(&conn, "patient1", UserType::Patient);

        let by_id = get_user(&conn, &id).unwrap().unwrap();
        assert_eq!(by_id.username, "patient1");
        assert_eq!(by_id.user_type, UserType::Patient);

        let by_name = get_user_by_username(&conn, "patient1").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert!(get_user_by_username(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let conn = test_db();
        make_user(&conn, "doctor1", UserType::Doctor);
        let result = insert_user(&conn, &User {
            id: Uuid::new_v4(),
            username: "doctor1".into(),
            email: None,
            full_name: "Someone Else".into(),
            user_type: UserType::Doctor,
            created_at: at(date(2025, 1, 1), 9, 0),
        });
        assert!(result.is_err());
    }

    #[test]
    fn users_by_type_only_returns_doctors() {
        let conn = test_db();
        make_user(&conn, "patient1", UserType::Patient);
        make_user(&conn, "doctor2", UserType::Doctor);
        make_user(&conn, "doctor1", UserType::Doctor);

        let doctors = get_users_by_type(&conn, UserType::Doctor).unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].full_name, "Full doctor1");
    }

    #[test]
    fn require_user_type_distinguishes_roles() {
        let conn = test_db();
        let doctor = make_user(&conn, "doctor1", UserType::Doctor);

        assert!(require_user_type(&conn, &doctor, UserType::Doctor).is_ok());
        let err = require_user_type(&conn, &doctor, UserType::Patient).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity_type, .. } if entity_type == "Patient"));
        assert!(require_user_type(&conn, &Uuid::new_v4(), UserType::Doctor).is_err());
    }

    #[test]
    fn medicines_listed_by_name() {
        let conn = test_db();
        make_medicine(&conn, "Omeprazole 20mg", None);
        make_medicine(&conn, "Cetirizine 10mg", None);

        let meds = get_all_medicines(&conn).unwrap();
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].name, "Cetirizine 10mg");
    }

    #[test]
    fn medicine_quantity_update_and_missing() {
        let conn = test_db();
        let id = make_medicine(&conn, "Paracetamol 500mg", None);

        update_medicine_quantity(&conn, &id, 12).unwrap();
        assert_eq!(get_medicine(&conn, &id).unwrap().unwrap().quantity, 12);

        let err = update_medicine_quantity(&conn, &Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn referenced_medicine_cannot_be_deleted_at_storage_level() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Ibuprofen 400mg", None);
        make_schedule(&conn, patient, med, date(2025, 3, 1), None);

        assert_eq!(count_schedules_for_medicine(&conn, &med).unwrap(), 1);
        assert!(delete_medicine(&conn, &med).is_err());
    }

    #[test]
    fn expiring_medicines_limited_to_patient_and_window() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let other = make_user(&conn, "patient2", UserType::Patient);
        let soon = make_medicine(&conn, "Soon", Some(date(2025, 3, 20)));
        let later = make_medicine(&conn, "Later", Some(date(2025, 6, 1)));
        let expired = make_medicine(&conn, "Expired", Some(date(2025, 2, 1)));
        let others = make_medicine(&conn, "Others", Some(date(2025, 3, 10)));
        for med in [soon, later, expired] {
            make_schedule(&conn, patient, med, date(2025, 3, 1), None);
        }
        make_schedule(&conn, other, others, date(2025, 3, 1), None);

        let expiring =
            get_expiring_medicines(&conn, &patient, date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].name, "Soon");
    }

    #[test]
    fn prescription_round_trip_and_delete() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let rx = Prescription {
            id: Uuid::new_v4(),
            patient_id: patient,
            doctor_id: None,
            prescription_date: date(2025, 3, 1),
            notes: Some("Follow up in 2 weeks".into()),
            file_path: None,
        };
        insert_prescription(&conn, &rx).unwrap();

        let stored = get_prescription(&conn, &rx.id).unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("Follow up in 2 weeks"));

        delete_prescription(&conn, &rx.id).unwrap();
        assert!(get_prescription(&conn, &rx.id).unwrap().is_none());
        assert!(delete_prescription(&conn, &rx.id).is_err());
    }

    #[test]
    fn patient_prescriptions_newest_first_with_doctor_name() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let doctor = make_user(&conn, "doctor1", UserType::Doctor);
        for (day, doctor_id) in [(1, Some(doctor)), (5, None)] {
            insert_prescription(&conn, &Prescription {
                id: Uuid::new_v4(),
                patient_id: patient,
                doctor_id,
                prescription_date: date(2025, 3, day),
                notes: None,
                file_path: None,
            }).unwrap();
        }

        let listed = get_prescriptions_for_patient(&conn, &patient).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].prescription.prescription_date, date(2025, 3, 5));
        assert!(listed[0].doctor_name.is_none());
        assert_eq!(listed[1].doctor_name.as_deref(), Some("Full doctor1"));
    }

    #[test]
    fn schedule_round_trip_preserves_slots() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), Some(date(2025, 3, 7)));

        let stored = get_schedule(&conn, &schedule.id).unwrap().unwrap();
        assert_eq!(stored.time_slots, schedule.time_slots);
        assert_eq!(stored.end_date, Some(date(2025, 3, 7)));
        assert_eq!(stored.notes.as_deref(), Some("after meals"));
    }

    #[test]
    fn list_schedules_filters_by_patient_and_activity() {
        let conn = test_db();
        let p1 = make_user(&conn, "patient1", UserType::Patient);
        let p2 = make_user(&conn, "patient2", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);

        let ongoing = make_schedule(&conn, p1, med, date(2025, 3, 1), None);
        let finished = make_schedule(&conn, p1, med, date(2025, 2, 1), Some(date(2025, 2, 10)));
        let future = make_schedule(&conn, p2, med, date(2025, 4, 1), None);

        assert_eq!(list_schedules(&conn, None, None).unwrap().len(), 3);
        assert_eq!(list_schedules(&conn, Some(&p1), None).unwrap().len(), 2);

        let active: Vec<Uuid> = list_schedules(&conn, None, Some(date(2025, 3, 5)))
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(active, vec![ongoing.id]);

        let boundary = list_schedules(&conn, Some(&p1), Some(date(2025, 2, 10))).unwrap();
        assert_eq!(boundary.len(), 1);
        assert_eq!(boundary[0].id, finished.id);

        assert!(list_schedules(&conn, Some(&p2), Some(date(2025, 3, 31))).unwrap().is_empty());
        assert_eq!(list_schedules(&conn, Some(&p2), Some(date(2025, 4, 1))).unwrap()[0].id, future.id);
    }

    #[test]
    fn update_schedule_missing_is_not_found() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let mut schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), None);
        schedule.id = Uuid::new_v4();
        assert!(matches!(update_schedule(&conn, &schedule), Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn dose_log_count_and_partial_delete() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), None);

        for day in 1..=3 {
            for hour in [8, 20] {
                insert_dose_log(&conn, &schedule.id, at(date(2025, 3, day), hour, 0), LogStatus::Scheduled)
                    .unwrap();
            }
        }

        assert_eq!(count_dose_logs_on(&conn, &schedule.id, date(2025, 3, 2)).unwrap(), 2);
        assert_eq!(count_dose_logs_on(&conn, &schedule.id, date(2025, 3, 4)).unwrap(), 0);

        let removed = delete_dose_logs(&conn, &schedule.id, Some(date(2025, 3, 2))).unwrap();
        assert_eq!(removed, 4);
        let remaining = get_dose_logs_for_schedule(&conn, &schedule.id).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|l| l.scheduled_time.date() == date(2025, 3, 1)));

        assert_eq!(delete_dose_logs(&conn, &schedule.id, None).unwrap(), 2);
    }

    #[test]
    fn duplicate_scheduled_time_rejected() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), None);
        let time = at(date(2025, 3, 1), 8, 0);

        insert_dose_log(&conn, &schedule.id, time, LogStatus::Scheduled).unwrap();
        assert!(insert_dose_log(&conn, &schedule.id, time, LogStatus::Scheduled).is_err());
    }

    #[test]
    fn dose_log_update_sets_taken_time() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), None);
        let id = insert_dose_log(&conn, &schedule.id, at(date(2025, 3, 1), 8, 0), LogStatus::Scheduled)
            .unwrap();

        let taken = at(date(2025, 3, 1), 8, 12);
        update_dose_log(&conn, &id, LogStatus::Taken, Some(taken), Some("with water")).unwrap();

        let log = get_dose_log(&conn, &id).unwrap().unwrap();
        assert_eq!(log.status, LogStatus::Taken);
        assert_eq!(log.taken_time, Some(taken));
        assert_eq!(log.notes.as_deref(), Some("with water"));

        assert!(update_dose_log(&conn, &Uuid::new_v4(), LogStatus::Skipped, None, None).is_err());
    }

    #[test]
    fn deleting_schedule_cascades_to_logs() {
        let conn = test_db();
        let patient = make_user(&conn, "patient1", UserType::Patient);
        let med = make_medicine(&conn, "Paracetamol", None);
        let schedule = make_schedule(&conn, patient, med, date(2025, 3, 1), None);
        insert_dose_log(&conn, &schedule.id, at(date(2025, 3, 1), 8, 0), LogStatus::Scheduled).unwrap();

        delete_schedule(&conn, &schedule.id).unwrap();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM medicine_logs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn parse_datetime_accepts_iso_t_separator() {
        let parsed = parse_datetime("2025-03-01T08:00:00").unwrap();
        assert_eq!(parsed, at(date(2025, 3, 1), 8, 0));
        assert!(parse_datetime("yesterday").is_err());
    }
}
