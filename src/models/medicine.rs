use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub details: Option<String>,
    pub quantity: u32,
    pub stocked_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub manufacturer: Option<String>,
    pub batch_no: Option<String>,
    pub storage: Option<String>,
    pub prescription_required: bool,
}
