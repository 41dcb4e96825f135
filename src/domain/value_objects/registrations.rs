use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Registrants this old or younger need a guardian on file.
pub const GUARDIAN_AGE_LIMIT: i32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// The three identity uploads collected by the registration form. All are
/// required; absence is a validation error, not a parse failure.
#[derive(Debug, Clone, Default)]
pub struct RegistrationUploads {
    pub document: Option<UploadedFile>,
    pub photo: Option<UploadedFile>,
    pub devotion_photo: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct SubmitRegistrationModel {
    pub full_name: String,
    pub gender: String,
    pub birth_date: String,
    pub whatsapp: String,
    pub emergency_contact: String,
    pub address: String,
    pub quote: String,
    pub cpf: String,
    pub guardian_confirmed: bool,
    pub guardian_name: Option<String>,
    pub uploads: RegistrationUploads,
}

/// Which stored upload an admin is downloading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Photo,
    DevotionPhoto,
}

impl UploadKind {
    pub fn from_str(kind: &str) -> Option<Self> {
        match kind {
            "document" => Some(UploadKind::Document),
            "photo" => Some(UploadKind::Photo),
            "devotion_photo" => Some(UploadKind::DevotionPhoto),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitRegistrationResponse {
    pub ok: bool,
    pub registration_id: Uuid,
}

/// Answer to the "did my CPF register already?" lookup.
#[derive(Debug, Serialize)]
pub struct CpfStatusDto {
    pub ok: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<Uuid>,
}

/// Full years of age on the given day.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_completed_years_only() {
        let birth = NaiveDate::from_ymd_opt(2009, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()), 15);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()), 16);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()), 16);
    }

    #[test]
    fn upload_kind_parses_known_kinds() {
        assert_eq!(UploadKind::from_str("document"), Some(UploadKind::Document));
        assert_eq!(UploadKind::from_str("devotion_photo"), Some(UploadKind::DevotionPhoto));
        assert_eq!(UploadKind::from_str("selfie"), None);
    }

    #[test]
    fn only_image_mimes_pass_the_upload_check() {
        let image = UploadedFile { bytes: vec![1], mime: "image/png".to_string() };
        let pdf = UploadedFile { bytes: vec![1], mime: "application/pdf".to_string() };
        assert!(image.is_image());
        assert!(!pdf.is_image());
    }
}
