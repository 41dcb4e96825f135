use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDonationModel {
    pub donor_name: String,
    pub contact: String,
    pub amount_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateDonationResponse {
    pub ok: bool,
    pub donation_id: Uuid,
}
