use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub prescription_date: NaiveDate,
    pub notes: Option<String>,
    pub file_path: Option<String>,
}

/// A prescription with the prescribing doctor's name, for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionListing {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub doctor_name: Option<String>,
}
