use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::PixCharge;
use crate::infrastructure::postgres::schema::donations;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = donations)]
pub struct DonationEntity {
    pub id: Uuid,
    pub donor_name: String,
    pub contact: String,
    pub amount_minor: i64,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DonationEntity {
    pub fn charge(&self) -> PixCharge {
        PixCharge {
            payment_id: self.payment_id.clone(),
            qr_code: self.qr_code.clone(),
            qr_base64: self.qr_base64.clone(),
            ticket_url: self.ticket_url.clone(),
            status: PaymentStatus::from_str(&self.status),
            paid_at: self.paid_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub struct InsertDonationEntity {
    pub donor_name: String,
    pub contact: String,
    pub amount_minor: i64,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
}
