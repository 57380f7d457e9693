//! User, inventory and prescription commands.

use chrono::Local;

use super::parse_id;
use super::state::AppState;
use crate::models::{Medicine, Prescription, PrescriptionListing, User};
use crate::records::{self, MedicineInput, NewUser, PrescriptionInput};

pub fn create_user(input: NewUser, state: &AppState) -> Result<User, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::create_user(&conn, &input, Local::now().naive_local()).map_err(|e| e.to_string())
}

pub fn list_doctors(state: &AppState) -> Result<Vec<User>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::list_doctors(&conn).map_err(|e| e.to_string())
}

pub fn add_medicine(input: MedicineInput, state: &AppState) -> Result<Medicine, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::add_medicine(&conn, &input).map_err(|e| e.to_string())
}

pub fn list_medicines(state: &AppState) -> Result<Vec<Medicine>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::list_medicines(&conn).map_err(|e| e.to_string())
}

pub fn update_medicine_quantity(
    medicine_id: String,
    quantity: String,
    state: &AppState,
) -> Result<Medicine, String> {
    let id = parse_id(&medicine_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::update_quantity(&conn, &id, &quantity).map_err(|e| e.to_string())
}

pub fn remove_medicine(medicine_id: String, state: &AppState) -> Result<(), String> {
    let id = parse_id(&medicine_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::remove_medicine(&conn, &id).map_err(|e| e.to_string())
}

pub fn add_prescription(
    input: PrescriptionInput,
    state: &AppState,
) -> Result<Prescription, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::add_prescription(&conn, &state.prescriptions_dir, &input).map_err(|e| e.to_string())
}

pub fn list_prescriptions(
    patient_id: String,
    state: &AppState,
) -> Result<Vec<PrescriptionListing>, String> {
    let id = parse_id(&patient_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::patient_prescriptions(&conn, &id).map_err(|e| e.to_string())
}

pub fn delete_prescription(prescription_id: String, state: &AppState) -> Result<(), String> {
    let id = parse_id(&prescription_id)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    records::delete_prescription(&conn, &id).map_err(|e| e.to_string())
}
