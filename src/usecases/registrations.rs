use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::registrations::InsertRegistrationEntity;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::repositories::registrations::RegistrationRepository;
use crate::domain::value_objects::cpf::{self, Cpf};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::money;
use crate::domain::value_objects::payments::{
    ChargeRequest, PaymentViewDto, REGISTRATION_DESCRIPTION,
};
use crate::domain::value_objects::registrations::{
    CpfStatusDto, GUARDIAN_AGE_LIMIT, SubmitRegistrationModel, UploadKind, UploadedFile, age_on,
};
use crate::infrastructure::postgres::postgres_connection::is_unique_violation;
use crate::usecases::payment_reconciliation::{
    NoApprovalSideEffect, PaymentReconciliationUseCase, PixGateway, ReconcileError,
    ReconcileOutcome,
};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid birth date")]
    InvalidBirthDate,
    #[error("Invalid CPF")]
    InvalidCpf,
    #[error("Upload is required: {0}")]
    MissingUpload(&'static str),
    #[error("Upload must be an image: {0}")]
    UploadNotImage(&'static str),
    #[error("Guardian confirmation is required for registrants under {GUARDIAN_AGE_LIMIT}")]
    GuardianConfirmationRequired,
    #[error("Guardian name is required for registrants under {GUARDIAN_AGE_LIMIT}")]
    GuardianNameRequired,
    #[error("A registration with this CPF already exists")]
    DuplicateCpf,
    #[error("Registration not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RegistrationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RegistrationError::MissingField(_)
            | RegistrationError::InvalidBirthDate
            | RegistrationError::InvalidCpf
            | RegistrationError::MissingUpload(_)
            | RegistrationError::UploadNotImage(_)
            | RegistrationError::GuardianConfirmationRequired
            | RegistrationError::GuardianNameRequired => StatusCode::BAD_REQUEST,
            RegistrationError::DuplicateCpf => StatusCode::CONFLICT,
            RegistrationError::NotFound => StatusCode::NOT_FOUND,
            RegistrationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

pub struct RegistrationUseCase<R, P, G>
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    registration_repo: Arc<R>,
    pix_gateway: Arc<G>,
    reconciliation: PaymentReconciliationUseCase<P, G, NoApprovalSideEffect>,
    amount_minor: i64,
}

impl<R, P, G> RegistrationUseCase<R, P, G>
where
    R: RegistrationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    pub fn new(
        registration_repo: Arc<R>,
        pix_gateway: Arc<G>,
        reconciliation: PaymentReconciliationUseCase<P, G, NoApprovalSideEffect>,
        amount_minor: i64,
    ) -> Self {
        Self {
            registration_repo,
            pix_gateway,
            reconciliation,
            amount_minor,
        }
    }

    pub async fn submit(&self, model: SubmitRegistrationModel) -> RegistrationResult<Uuid> {
        info!("registrations: submission received");

        let full_name = required_field(&model.full_name, "full_name")?;
        let gender = required_field(&model.gender, "gender")?;
        let whatsapp = required_field(&model.whatsapp, "whatsapp")?;
        let emergency_contact = required_field(&model.emergency_contact, "emergency_contact")?;
        let address = required_field(&model.address, "address")?;
        let quote = required_field(&model.quote, "quote")?;

        let birth_date = NaiveDate::parse_from_str(model.birth_date.trim(), "%Y-%m-%d")
            .map_err(|_| RegistrationError::InvalidBirthDate)?;

        let cpf = Cpf::parse(&model.cpf).map_err(|err| {
            warn!(cpf_error = %err, "registrations: CPF rejected");
            RegistrationError::InvalidCpf
        })?;

        if self
            .registration_repo
            .find_by_cpf(cpf.as_str().to_string())
            .await
            .map_err(RegistrationError::Internal)?
            .is_some()
        {
            warn!("registrations: duplicate CPF submission rejected");
            return Err(RegistrationError::DuplicateCpf);
        }

        let document = required_image(&model.uploads.document, "document")?;
        let photo = required_image(&model.uploads.photo, "photo")?;
        let devotion_photo = required_image(&model.uploads.devotion_photo, "devotion_photo")?;

        let guardian_name = model
            .guardian_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let age = age_on(birth_date, Utc::now().date_naive());
        if age <= GUARDIAN_AGE_LIMIT {
            if !model.guardian_confirmed {
                return Err(RegistrationError::GuardianConfirmationRequired);
            }
            if guardian_name.is_none() {
                return Err(RegistrationError::GuardianNameRequired);
            }
        }

        let payment = self
            .pix_gateway
            .create_payment(ChargeRequest {
                amount_minor: self.amount_minor,
                description: REGISTRATION_DESCRIPTION.to_string(),
                payer_name: full_name.clone(),
                payer_cpf: Some(cpf.as_str().to_string()),
            })
            .await
            .map_err(|err| {
                error!(error = ?err, "registrations: failed to create PIX charge");
                RegistrationError::Internal(err)
            })?;

        let registration_id = self
            .registration_repo
            .insert(InsertRegistrationEntity {
                full_name,
                gender,
                birth_date,
                whatsapp,
                emergency_contact,
                address,
                quote,
                guardian_name,
                cpf: cpf.into_string(),
                document_blob: document.bytes.clone(),
                document_mime: document.mime.clone(),
                photo_blob: photo.bytes.clone(),
                photo_mime: photo.mime.clone(),
                devotion_photo_blob: devotion_photo.bytes.clone(),
                devotion_photo_mime: devotion_photo.mime.clone(),
                payment_id: Some(payment.payment_id),
                qr_code: payment.qr_code,
                qr_base64: payment.qr_base64,
                ticket_url: payment.ticket_url,
                status: PaymentStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    return RegistrationError::DuplicateCpf;
                }
                error!(db_error = ?err, "registrations: failed to insert registration");
                RegistrationError::Internal(err)
            })?;

        info!(%registration_id, "registrations: registration created with pending charge");
        Ok(registration_id)
    }

    pub async fn payment_view(&self, id: Uuid) -> RegistrationResult<PaymentViewDto> {
        let registration = self
            .registration_repo
            .find_overview(id)
            .await
            .map_err(RegistrationError::Internal)?
            .ok_or(RegistrationError::NotFound)?;

        let charge = registration.charge();
        Ok(PaymentViewDto {
            id: registration.id,
            qr_code: charge.qr_code,
            qr_base64: charge.qr_base64,
            ticket_url: charge.ticket_url,
            status: charge.status,
            amount: money::format_brl(self.amount_minor),
        })
    }

    pub async fn poll_status(&self, id: Uuid) -> Result<ReconcileOutcome, ReconcileError> {
        self.reconciliation.reconcile(id).await
    }

    pub async fn status_by_cpf(&self, raw_cpf: &str) -> RegistrationResult<CpfStatusDto> {
        let digits = cpf::normalize(raw_cpf);
        if digits.len() != 11 {
            return Ok(CpfStatusDto {
                ok: true,
                exists: false,
                paid: None,
                status: None,
                registration_id: None,
            });
        }

        let Some(registration) = self
            .registration_repo
            .find_by_cpf(digits)
            .await
            .map_err(RegistrationError::Internal)?
        else {
            return Ok(CpfStatusDto {
                ok: true,
                exists: false,
                paid: None,
                status: None,
                registration_id: None,
            });
        };

        let charge = registration.charge();
        let paid = charge.status.is_approved() || charge.paid_at.is_some();
        Ok(CpfStatusDto {
            ok: true,
            exists: true,
            paid: Some(paid),
            status: Some(charge.status),
            registration_id: Some(registration.id),
        })
    }

    pub async fn find_upload(
        &self,
        id: Uuid,
        kind: UploadKind,
    ) -> RegistrationResult<(Vec<u8>, String)> {
        self.registration_repo
            .find_upload(id, kind)
            .await
            .map_err(RegistrationError::Internal)?
            .ok_or(RegistrationError::NotFound)
    }
}

fn required_field(value: &str, name: &'static str) -> RegistrationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationError::MissingField(name));
    }
    Ok(trimmed.to_string())
}

fn required_image<'a>(
    upload: &'a Option<UploadedFile>,
    name: &'static str,
) -> RegistrationResult<&'a UploadedFile> {
    let file = upload
        .as_ref()
        .ok_or(RegistrationError::MissingUpload(name))?;
    if file.bytes.is_empty() {
        return Err(RegistrationError::MissingUpload(name));
    }
    if !file.is_image() {
        return Err(RegistrationError::UploadNotImage(name));
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::registrations::RegistrationOverviewEntity;
    use crate::domain::repositories::payables::MockPayableRepository;
    use crate::domain::repositories::registrations::MockRegistrationRepository;
    use crate::domain::value_objects::registrations::RegistrationUploads;
    use crate::payments::pix_client::PixPaymentData;
    use crate::usecases::payment_reconciliation::MockPixGateway;
    use chrono::Duration;
    use mockall::predicate::eq;

    const AMOUNT_MINOR: i64 = 10_100;

    fn png_upload() -> Option<UploadedFile> {
        Some(UploadedFile {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            mime: "image/png".to_string(),
        })
    }

    fn sample_model() -> SubmitRegistrationModel {
        SubmitRegistrationModel {
            full_name: "Ana Maria".to_string(),
            gender: "feminino".to_string(),
            birth_date: "1998-04-12".to_string(),
            whatsapp: "+55 11 91234-5678".to_string(),
            emergency_contact: "Maria (mother) +55 11 99999-0000".to_string(),
            address: "Rua das Flores, 10".to_string(),
            quote: "Totus tuus".to_string(),
            cpf: "529.982.247-25".to_string(),
            guardian_confirmed: false,
            guardian_name: None,
            uploads: RegistrationUploads {
                document: png_upload(),
                photo: png_upload(),
                devotion_photo: png_upload(),
            },
        }
    }

    fn usecase(
        registration_repo: MockRegistrationRepository,
        gateway: MockPixGateway,
    ) -> RegistrationUseCase<MockRegistrationRepository, MockPayableRepository, MockPixGateway>
    {
        let reconciliation = PaymentReconciliationUseCase::new(
            Arc::new(MockPayableRepository::new()),
            Arc::new(MockPixGateway::new()),
            Arc::new(NoApprovalSideEffect),
        );
        RegistrationUseCase::new(
            Arc::new(registration_repo),
            Arc::new(gateway),
            reconciliation,
            AMOUNT_MINOR,
        )
    }

    fn overview(id: Uuid, cpf: &str, status: &str) -> RegistrationOverviewEntity {
        RegistrationOverviewEntity {
            id,
            full_name: "Ana Maria".to_string(),
            whatsapp: "+55 11 91234-5678".to_string(),
            cpf: cpf.to_string(),
            payment_id: Some("pay-1".to_string()),
            qr_code: Some("qr".to_string()),
            qr_base64: Some("qr-b64".to_string()),
            ticket_url: None,
            status: status.to_string(),
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn submit_creates_charge_and_inserts_registration() {
        let mut registration_repo = MockRegistrationRepository::new();
        let mut gateway = MockPixGateway::new();
        let registration_id = Uuid::new_v4();

        registration_repo
            .expect_find_by_cpf()
            .with(eq("52998224725".to_string()))
            .returning(|_| Box::pin(async move { Ok(None) }));
        gateway
            .expect_create_payment()
            .withf(|request| {
                request.amount_minor == AMOUNT_MINOR
                    && request.description == REGISTRATION_DESCRIPTION
                    && request.payer_cpf.as_deref() == Some("52998224725")
            })
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(PixPaymentData {
                        payment_id: "pay-1".to_string(),
                        qr_code: Some("qr".to_string()),
                        qr_base64: Some("qr-b64".to_string()),
                        ticket_url: None,
                    })
                })
            });
        registration_repo
            .expect_insert()
            .withf(|entity| {
                entity.cpf == "52998224725"
                    && entity.status == "pending"
                    && entity.payment_id.as_deref() == Some("pay-1")
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(registration_id) }));

        let result = usecase(registration_repo, gateway)
            .submit(sample_model())
            .await
            .unwrap();

        assert_eq!(result, registration_id);
    }

    #[tokio::test]
    async fn duplicate_cpf_is_rejected_with_conflict() {
        let mut registration_repo = MockRegistrationRepository::new();
        let existing = overview(Uuid::new_v4(), "52998224725", "pending");

        registration_repo.expect_find_by_cpf().returning(move |_| {
            let existing = existing.clone();
            Box::pin(async move { Ok(Some(existing)) })
        });

        let err = usecase(registration_repo, MockPixGateway::new())
            .submit(sample_model())
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::DuplicateCpf));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn repeated_digit_cpf_is_always_rejected() {
        let mut model = sample_model();
        model.cpf = "111.111.111-11".to_string();

        let err = usecase(MockRegistrationRepository::new(), MockPixGateway::new())
            .submit(model)
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::InvalidCpf));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let mut registration_repo = MockRegistrationRepository::new();
        registration_repo
            .expect_find_by_cpf()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let mut model = sample_model();
        model.uploads.photo = Some(UploadedFile {
            bytes: vec![1, 2, 3],
            mime: "application/pdf".to_string(),
        });

        let err = usecase(registration_repo, MockPixGateway::new())
            .submit(model)
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::UploadNotImage("photo")));
    }

    #[tokio::test]
    async fn minor_without_guardian_is_rejected() {
        let mut registration_repo = MockRegistrationRepository::new();
        registration_repo
            .expect_find_by_cpf()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let mut model = sample_model();
        let fifteen_years_ago = (Utc::now() - Duration::days(15 * 365)).date_naive();
        model.birth_date = fifteen_years_ago.format("%Y-%m-%d").to_string();

        let err = usecase(registration_repo, MockPixGateway::new())
            .submit(model)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistrationError::GuardianConfirmationRequired
        ));
    }

    #[tokio::test]
    async fn minor_with_confirmation_still_needs_guardian_name() {
        let mut registration_repo = MockRegistrationRepository::new();
        registration_repo
            .expect_find_by_cpf()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let mut model = sample_model();
        let fifteen_years_ago = (Utc::now() - Duration::days(15 * 365)).date_naive();
        model.birth_date = fifteen_years_ago.format("%Y-%m-%d").to_string();
        model.guardian_confirmed = true;
        model.guardian_name = Some("   ".to_string());

        let err = usecase(registration_repo, MockPixGateway::new())
            .submit(model)
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::GuardianNameRequired));
    }

    #[tokio::test]
    async fn status_by_cpf_short_input_reports_absent_without_queries() {
        let result = usecase(MockRegistrationRepository::new(), MockPixGateway::new())
            .status_by_cpf("123")
            .await
            .unwrap();

        assert!(!result.exists);
        assert_eq!(result.registration_id, None);
    }

    #[tokio::test]
    async fn status_by_cpf_reports_paid_for_approved_registrations() {
        let registration_id = Uuid::new_v4();
        let mut registration_repo = MockRegistrationRepository::new();
        let found = overview(registration_id, "52998224725", "approved");

        registration_repo
            .expect_find_by_cpf()
            .with(eq("52998224725".to_string()))
            .returning(move |_| {
                let found = found.clone();
                Box::pin(async move { Ok(Some(found)) })
            });

        let result = usecase(registration_repo, MockPixGateway::new())
            .status_by_cpf("529.982.247-25")
            .await
            .unwrap();

        assert!(result.exists);
        assert_eq!(result.paid, Some(true));
        assert_eq!(result.registration_id, Some(registration_id));
    }
}
