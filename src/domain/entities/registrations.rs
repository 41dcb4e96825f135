use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::PixCharge;
use crate::infrastructure::postgres::schema::inscricoes;

/// Registration row without the upload blobs; those are only ever fetched
/// column-wise for downloads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inscricoes)]
pub struct RegistrationOverviewEntity {
    pub id: Uuid,
    pub full_name: String,
    pub whatsapp: String,
    pub cpf: String,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RegistrationOverviewEntity {
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
#[diesel(table_name = inscricoes)]
pub struct InsertRegistrationEntity {
    pub full_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub whatsapp: String,
    pub emergency_contact: String,
    pub address: String,
    pub quote: String,
    pub guardian_name: Option<String>,
    pub cpf: String,
    pub document_blob: Vec<u8>,
    pub document_mime: String,
    pub photo_blob: Vec<u8>,
    pub photo_mime: String,
    pub devotion_photo_blob: Vec<u8>,
    pub devotion_photo_mime: String,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
}
