//! Sample clinic data for a fresh database.
//!
//! Medicines and users are seeded independently, each only when its table is
//! empty. Seeding users also creates a prescription and two schedules for
//! `patient1`; their dose logs are left to window materialization.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use super::DatabaseError;
use crate::db;
use crate::models::enums::UserType;
use crate::models::{Medicine, Prescription, Schedule, User};
use crate::schedule::parse_time_slots;

/// What a seeding pass inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub medicines: usize,
    pub users: usize,
    pub schedules: usize,
}

struct SampleMedicine {
    name: &'static str,
    details: &'static str,
    quantity: u32,
    shelf_days: i64,
    manufacturer: &'static str,
    batch_no: &'static str,
    storage: &'static str,
    prescription_required: bool,
}

const SAMPLE_MEDICINES: &[SampleMedicine] = &[
    SampleMedicine {
        name: "Paracetamol 500mg",
        details: "Pain reliever and fever reducer",
        quantity: 100,
        shelf_days: 730,
        manufacturer: "GlaxoSmithKline",
        batch_no: "PCM202401",
        storage: "Store below 30°C in a dry place",
        prescription_required: false,
    },
    SampleMedicine {
        name: "Ibuprofen 400mg",
        details: "Non-steroidal anti-inflammatory drug (NSAID)",
        quantity: 60,
        shelf_days: 730,
        manufacturer: "Pfizer",
        batch_no: "IBU202401",
        storage: "Store at room temperature",
        prescription_required: false,
    },
    SampleMedicine {
        name: "Amoxicillin 250mg",
        details: "Antibiotic used to treat bacterial infections",
        quantity: 30,
        shelf_days: 365,
        manufacturer: "Novartis",
        batch_no: "AMX202401",
        storage: "Store below 25°C in a dry place",
        prescription_required: true,
    },
    SampleMedicine {
        name: "Cetirizine 10mg",
        details: "Antihistamine for allergy relief",
        quantity: 40,
        shelf_days: 730,
        manufacturer: "Sun Pharma",
        batch_no: "CTZ202401",
        storage: "Store at room temperature, away from light",
        prescription_required: false,
    },
    SampleMedicine {
        name: "Omeprazole 20mg",
        details: "Proton pump inhibitor for acid reflux and heartburn",
        quantity: 28,
        shelf_days: 730,
        manufacturer: "AstraZeneca",
        batch_no: "OMP202401",
        storage: "Store at room temperature, away from moisture",
        prescription_required: false,
    },
];

/// (username, email, full name, type)
const SAMPLE_USERS: &[(&str, &str, &str, UserType)] = &[
    ("patient1", "patient1@example.com", "John Smith", UserType::Patient),
    ("patient2", "patient2@example.com", "Jane Doe", UserType::Patient),
    ("doctor1", "doctor1@example.com", "Dr. Robert Johnson", UserType::Doctor),
    ("admin", "admin@example.com", "Admin User", UserType::Admin),
];

fn table_is_empty(conn: &Connection, table: &str) -> Result<bool, DatabaseError> {
    let count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count == 0)
}

/// Seed sample data into empty tables, all in one transaction.
pub fn seed_if_empty(conn: &Connection, now: NaiveDateTime) -> Result<SeedSummary, DatabaseError> {
    let today = now.date();
    let tx = conn.unchecked_transaction()?;
    let mut summary = SeedSummary::default();

    if table_is_empty(conn, "medicines")? {
        summary.medicines = seed_medicines(conn, today)?;
    }
    if table_is_empty(conn, "users")? {
        summary.users = seed_users(conn, now)?;
        summary.schedules = seed_patient_data(conn, today)?;
    }

    tx.commit()?;
    if summary != SeedSummary::default() {
        tracing::info!(
            medicines = summary.medicines,
            users = summary.users,
            schedules = summary.schedules,
            "Seeded sample data"
        );
    }
    Ok(summary)
}

fn seed_medicines(conn: &Connection, today: NaiveDate) -> Result<usize, DatabaseError> {
    for sample in SAMPLE_MEDICINES {
        db::insert_medicine(conn, &Medicine {
            id: Uuid::new_v4(),
            name: sample.name.into(),
            details: Some(sample.details.into()),
            quantity: sample.quantity,
            stocked_on: today,
            expires_on: Some(today + Duration::days(sample.shelf_days)),
            manufacturer: Some(sample.manufacturer.into()),
            batch_no: Some(sample.batch_no.into()),
            storage: Some(sample.storage.into()),
            prescription_required: sample.prescription_required,
        })?;
    }
    Ok(SAMPLE_MEDICINES.len())
}

fn seed_users(conn: &Connection, now: NaiveDateTime) -> Result<usize, DatabaseError> {
    for (username, email, full_name, user_type) in SAMPLE_USERS {
        db::insert_user(conn, &User {
            id: Uuid::new_v4(),
            username: (*username).into(),
            email: Some((*email).into()),
            full_name: (*full_name).into(),
            user_type: *user_type,
            created_at: now,
        })?;
    }
    Ok(SAMPLE_USERS.len())
}

fn seed_patient_data(conn: &Connection, today: NaiveDate) -> Result<usize, DatabaseError> {
    let (Some(patient), Some(doctor)) = (
        db::get_user_by_username(conn, "patient1")?,
        db::get_user_by_username(conn, "doctor1")?,
    ) else {
        return Ok(0);
    };

    let rx = Prescription {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id: Some(doctor.id),
        prescription_date: today,
        notes: Some("Take medicines as prescribed. Follow up in 2 weeks.".into()),
        file_path: None,
    };
    db::insert_prescription(conn, &rx)?;

    let medicines = db::get_all_medicines(conn)?;
    let find = |name: &str| medicines.iter().find(|m| m.name == name).map(|m| m.id);
    let plans = [
        ("Paracetamol 500mg", "3 times daily", 7, "08:00,14:00,20:00", "Take after meals"),
        (
            "Ibuprofen 400mg",
            "twice daily",
            5,
            "09:00,21:00",
            "Take with food to avoid stomach upset",
        ),
    ];

    let mut created = 0;
    for (name, frequency, days, slots, notes) in plans {
        let Some(medicine_id) = find(name) else {
            continue;
        };
        let time_slots = parse_time_slots(slots)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        db::insert_schedule(conn, &Schedule {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            medicine_id,
            prescription_id: Some(rx.id),
            dosage: "1 tablet".into(),
            frequency: frequency.into(),
            start_date: today,
            end_date: Some(today + Duration::days(days)),
            time_slots,
            notes: Some(notes.into()),
        })?;
        created += 1;
    }
    Ok(created)
}
