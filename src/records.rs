//! Clinic records: users, medicine inventory and prescriptions.
//!
//! Validation and referential checks in front of the repository layer, plus
//! the prescription file store under `prescriptions/user_<patient>/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::UserType;
use crate::models::{Medicine, Prescription, PrescriptionListing, User};

// ═══════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Referential(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatabaseError> for RecordsError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound { .. } => RecordsError::Referential(e.to_string()),
            other => RecordsError::Database(other),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, RecordsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordsError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

// ═══════════════════════════════════════════
// Users
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    /// `patient`, `doctor` or `admin`.
    pub user_type: String,
}

pub fn create_user(
    conn: &Connection,
    input: &NewUser,
    now: NaiveDateTime,
) -> Result<User, RecordsError> {
    let username = required(&input.username, "username")?;
    let full_name = required(&input.full_name, "full name")?;
    let user_type = UserType::from_str(input.user_type.trim())
        .map_err(|_| RecordsError::Validation(format!("unknown user type '{}'", input.user_type)))?;

    if db::get_user_by_username(conn, &username)?.is_some() {
        return Err(RecordsError::Validation(format!("username '{username}' is already taken")));
    }
    let email = optional(&input.email);
    if let Some(email) = &email {
        if db::get_user_by_email(conn, email)?.is_some() {
            return Err(RecordsError::Validation(format!("email '{email}' is already registered")));
        }
    }

    let user = User {
        id: Uuid::new_v4(),
        username,
        email,
        full_name,
        user_type,
        created_at: now,
    };
    db::insert_user(conn, &user)?;
    tracing::info!(user_id = %user.id, user_type = %user.user_type, "User created");
    Ok(user)
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<User>, RecordsError> {
    Ok(db::get_users_by_type(conn, UserType::Doctor)?)
}

// ═══════════════════════════════════════════
// Medicine inventory
// ═══════════════════════════════════════════

/// Form input for a new medicine. Quantity arrives as typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineInput {
    pub name: String,
    pub details: Option<String>,
    pub quantity: String,
    pub stocked_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub manufacturer: Option<String>,
    pub batch_no: Option<String>,
    pub storage: Option<String>,
    pub prescription_required: bool,
}

fn parse_quantity(raw: &str) -> Result<u32, RecordsError> {
    raw.trim().parse::<u32>().map_err(|_| {
        RecordsError::Validation(format!(
            "quantity must be a non-negative whole number, got '{raw}'"
        ))
    })
}

pub fn add_medicine(conn: &Connection, input: &MedicineInput) -> Result<Medicine, RecordsError> {
    let name = required(&input.name, "medicine name")?;
    let quantity = parse_quantity(&input.quantity)?;
    if let Some(expires_on) = input.expires_on {
        if expires_on < input.stocked_on {
            return Err(RecordsError::Validation(format!(
                "expiry date {expires_on} is before stocked-on date {}",
                input.stocked_on
            )));
        }
    }

    let medicine = Medicine {
        id: Uuid::new_v4(),
        name,
        details: optional(&input.details),
        quantity,
        stocked_on: input.stocked_on,
        expires_on: input.expires_on,
        manufacturer: optional(&input.manufacturer),
        batch_no: optional(&input.batch_no),
        storage: optional(&input.storage),
        prescription_required: input.prescription_required,
    };
    db::insert_medicine(conn, &medicine)?;
    tracing::info!(medicine_id = %medicine.id, quantity, "Medicine added");
    Ok(medicine)
}

pub fn list_medicines(conn: &Connection) -> Result<Vec<Medicine>, RecordsError> {
    Ok(db::get_all_medicines(conn)?)
}

pub fn get_medicine(conn: &Connection, id: &Uuid) -> Result<Medicine, RecordsError> {
    db::get_medicine(conn, id)?
        .ok_or_else(|| RecordsError::Referential(format!("Medicine not found: {id}")))
}

pub fn update_quantity(conn: &Connection, id: &Uuid, raw: &str) -> Result<Medicine, RecordsError> {
    let quantity = parse_quantity(raw)?;
    db::update_medicine_quantity(conn, id, quantity)?;
    get_medicine(conn, id)
}

/// Remove a medicine from inventory. Refused while any schedule uses it.
pub fn remove_medicine(conn: &Connection, id: &Uuid) -> Result<(), RecordsError> {
    let medicine = get_medicine(conn, id)?;
    let in_use = db::count_schedules_for_medicine(conn, id)?;
    if in_use > 0 {
        return Err(RecordsError::Referential(format!(
            "{} is used by {in_use} schedule(s)",
            medicine.name
        )));
    }
    db::delete_medicine(conn, id)?;
    tracing::info!(medicine_id = %id, "Medicine removed");
    Ok(())
}

/// Medicines on the patient's schedules that expire within `days` of `today`.
pub fn expiring_medicines(
    conn: &Connection,
    patient_id: &Uuid,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<Medicine>, RecordsError> {
    db::require_user_type(conn, patient_id, UserType::Patient)?;
    let until = today
        .checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MAX);
    Ok(db::get_expiring_medicines(conn, patient_id, today, until)?)
}

// ═══════════════════════════════════════════
// Prescriptions
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionInput {
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub prescription_date: NaiveDate,
    pub notes: Option<String>,
    /// Scanned prescription to copy into the file store.
    pub source_file: Option<PathBuf>,
}

fn stored_file_path(files_root: &Path, patient_id: &Uuid, rx_id: &Uuid, source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "prescription".into());
    files_root
        .join(format!("user_{patient_id}"))
        .join(format!("{rx_id}_{file_name}"))
}

fn remove_file_best_effort(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove prescription file");
    }
}

pub fn add_prescription(
    conn: &Connection,
    files_root: &Path,
    input: &PrescriptionInput,
) -> Result<Prescription, RecordsError> {
    db::require_user_type(conn, &input.patient_id, UserType::Patient)?;
    if let Some(doctor_id) = input.doctor_id {
        db::require_user_type(conn, &doctor_id, UserType::Doctor)?;
    }

    let id = Uuid::new_v4();
    let stored = match &input.source_file {
        Some(source) => {
            let dest = stored_file_path(files_root, &input.patient_id, &id, source);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source, &dest)?;
            Some(dest)
        }
        None => None,
    };

    let rx = Prescription {
        id,
        patient_id: input.patient_id,
        doctor_id: input.doctor_id,
        prescription_date: input.prescription_date,
        notes: optional(&input.notes),
        file_path: stored.as_ref().map(|p| p.to_string_lossy().into_owned()),
    };
    if let Err(e) = db::insert_prescription(conn, &rx) {
        if let Some(path) = &stored {
            remove_file_best_effort(path);
        }
        return Err(e.into());
    }

    tracing::info!(prescription_id = %rx.id, has_file = stored.is_some(), "Prescription added");
    Ok(rx)
}

pub fn patient_prescriptions(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<PrescriptionListing>, RecordsError> {
    db::require_user_type(conn, patient_id, UserType::Patient)?;
    Ok(db::get_prescriptions_for_patient(conn, patient_id)?)
}

/// Delete a prescription. The row is removed even when its file cannot be.
pub fn delete_prescription(conn: &Connection, id: &Uuid) -> Result<(), RecordsError> {
    let rx = db::get_prescription(conn, id)?
        .ok_or_else(|| RecordsError::Referential(format!("Prescription not found: {id}")))?;
    db::delete_prescription(conn, id)?;

    if let Some(path) = rx.file_path.as_deref() {
        remove_file_best_effort(Path::new(path));
    }
    tracing::info!(prescription_id = %id, "Prescription deleted");
    Ok(())
}
