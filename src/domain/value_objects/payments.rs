use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

pub const REGISTRATION_DESCRIPTION: &str = "Retreat registration";
pub const ORDER_DESCRIPTION: &str = "Retreat shop order";
pub const DONATION_DESCRIPTION: &str = "Retreat donation";

/// The one payment shape shared by registrations, orders and donations:
/// gateway payment id plus the PIX artifacts handed to the payer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixCharge {
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Everything needed to (re)create a charge at the gateway for a payable.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub description: String,
    pub payer_name: String,
    pub payer_cpf: Option<String>,
}

/// A freshly created gateway charge, about to replace a payable's stored
/// payment fields. Status is implicitly pending and paid_at cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    pub payment_id: String,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
}

/// A payable row seen through the reconciliation engine: any of the three
/// domains, reduced to its charge and the request that can recreate it.
#[derive(Debug, Clone, PartialEq)]
pub struct PayableRecord {
    pub id: Uuid,
    /// Set for orders; drives the clear-cart side effect.
    pub owner_user_id: Option<Uuid>,
    pub charge: PixCharge,
    pub request: ChargeRequest,
}

/// Payment page payload: the stored PIX artifacts plus the display amount.
#[derive(Debug, Serialize)]
pub struct PaymentViewDto {
    pub id: Uuid,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: PaymentStatus,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct StatusPollResponse {
    pub ok: bool,
    pub status: PaymentStatus,
    pub paid: bool,
    pub recreated: bool,
}
