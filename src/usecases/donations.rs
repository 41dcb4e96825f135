use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::donations::InsertDonationEntity;
use crate::domain::repositories::donations::DonationRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::donations::CreateDonationModel;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::money;
use crate::domain::value_objects::payments::{
    ChargeRequest, DONATION_DESCRIPTION, PaymentViewDto,
};
use crate::usecases::payment_reconciliation::{
    NoApprovalSideEffect, PaymentReconciliationUseCase, PixGateway, ReconcileError,
    ReconcileOutcome,
};

#[derive(Debug, Error)]
pub enum DonationError {
    #[error("Donor name, contact and a positive amount are required")]
    InvalidDonation,
    #[error("Donation not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DonationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DonationError::InvalidDonation => StatusCode::BAD_REQUEST,
            DonationError::NotFound => StatusCode::NOT_FOUND,
            DonationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct DonationUseCase<D, P, G>
where
    D: DonationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    donation_repo: Arc<D>,
    pix_gateway: Arc<G>,
    reconciliation: PaymentReconciliationUseCase<P, G, NoApprovalSideEffect>,
}

impl<D, P, G> DonationUseCase<D, P, G>
where
    D: DonationRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
{
    pub fn new(
        donation_repo: Arc<D>,
        pix_gateway: Arc<G>,
        reconciliation: PaymentReconciliationUseCase<P, G, NoApprovalSideEffect>,
    ) -> Self {
        Self {
            donation_repo,
            pix_gateway,
            reconciliation,
        }
    }

    pub async fn create(&self, model: CreateDonationModel) -> Result<Uuid, DonationError> {
        let donor_name = model.donor_name.trim().to_string();
        let contact = model.contact.trim().to_string();
        if donor_name.is_empty() || contact.is_empty() || model.amount_minor <= 0 {
            return Err(DonationError::InvalidDonation);
        }

        // Donations carry no CPF; the gateway gets only the donor's name.
        let payment = self
            .pix_gateway
            .create_payment(ChargeRequest {
                amount_minor: model.amount_minor,
                description: DONATION_DESCRIPTION.to_string(),
                payer_name: donor_name.clone(),
                payer_cpf: None,
            })
            .await
            .map_err(|err| {
                error!(error = ?err, "donations: failed to create PIX charge");
                DonationError::Internal(err)
            })?;

        let donation_id = self
            .donation_repo
            .insert(InsertDonationEntity {
                donor_name,
                contact,
                amount_minor: model.amount_minor,
                payment_id: Some(payment.payment_id),
                qr_code: payment.qr_code,
                qr_base64: payment.qr_base64,
                ticket_url: payment.ticket_url,
                status: PaymentStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "donations: failed to insert donation");
                DonationError::Internal(err)
            })?;

        info!(%donation_id, amount_minor = model.amount_minor, "donations: donation created with pending charge");
        Ok(donation_id)
    }

    pub async fn payment_view(&self, id: Uuid) -> Result<PaymentViewDto, DonationError> {
        let donation = self
            .donation_repo
            .find(id)
            .await
            .map_err(DonationError::Internal)?
            .ok_or(DonationError::NotFound)?;

        let charge = donation.charge();
        Ok(PaymentViewDto {
            id: donation.id,
            qr_code: charge.qr_code,
            qr_base64: charge.qr_base64,
            ticket_url: charge.ticket_url,
            status: charge.status,
            amount: money::format_brl(donation.amount_minor),
        })
    }

    pub async fn poll_status(&self, id: Uuid) -> Result<ReconcileOutcome, ReconcileError> {
        self.reconciliation.reconcile(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::donations::DonationEntity;
    use crate::domain::repositories::donations::MockDonationRepository;
    use crate::domain::repositories::payables::MockPayableRepository;
    use crate::payments::pix_client::PixPaymentData;
    use crate::usecases::payment_reconciliation::MockPixGateway;
    use chrono::Utc;

    fn usecase(
        donation_repo: MockDonationRepository,
        gateway: MockPixGateway,
    ) -> DonationUseCase<MockDonationRepository, MockPayableRepository, MockPixGateway> {
        let reconciliation = PaymentReconciliationUseCase::new(
            Arc::new(MockPayableRepository::new()),
            Arc::new(MockPixGateway::new()),
            Arc::new(NoApprovalSideEffect),
        );
        DonationUseCase::new(Arc::new(donation_repo), Arc::new(gateway), reconciliation)
    }

    #[tokio::test]
    async fn create_rejects_blank_fields_and_non_positive_amounts() {
        let usecase = usecase(MockDonationRepository::new(), MockPixGateway::new());

        for model in [
            CreateDonationModel {
                donor_name: "  ".to_string(),
                contact: "+55 11 9".to_string(),
                amount_minor: 5000,
            },
            CreateDonationModel {
                donor_name: "Ana".to_string(),
                contact: "".to_string(),
                amount_minor: 5000,
            },
            CreateDonationModel {
                donor_name: "Ana".to_string(),
                contact: "+55 11 9".to_string(),
                amount_minor: 0,
            },
        ] {
            let err = usecase.create(model).await.unwrap_err();
            assert!(matches!(err, DonationError::InvalidDonation));
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn create_charges_without_cpf_and_stores_pending() {
        let donation_id = Uuid::new_v4();
        let mut donation_repo = MockDonationRepository::new();
        let mut gateway = MockPixGateway::new();

        gateway
            .expect_create_payment()
            .withf(|request| {
                request.amount_minor == 5000
                    && request.description == DONATION_DESCRIPTION
                    && request.payer_cpf.is_none()
            })
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(PixPaymentData {
                        payment_id: "pay-7".to_string(),
                        qr_code: Some("qr".to_string()),
                        qr_base64: None,
                        ticket_url: None,
                    })
                })
            });
        donation_repo
            .expect_insert()
            .withf(|entity| {
                entity.status == "pending" && entity.payment_id.as_deref() == Some("pay-7")
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(donation_id) }));

        let result = usecase(donation_repo, gateway)
            .create(CreateDonationModel {
                donor_name: " Ana ".to_string(),
                contact: "+55 11 91234-5678".to_string(),
                amount_minor: 5000,
            })
            .await
            .unwrap();

        assert_eq!(result, donation_id);
    }

    #[tokio::test]
    async fn payment_view_formats_the_donated_amount() {
        let donation = DonationEntity {
            id: Uuid::new_v4(),
            donor_name: "Ana".to_string(),
            contact: "+55 11 91234-5678".to_string(),
            amount_minor: 5000,
            payment_id: Some("pay-7".to_string()),
            qr_code: Some("qr".to_string()),
            qr_base64: None,
            ticket_url: None,
            status: "pending".to_string(),
            paid_at: None,
            created_at: Utc::now(),
        };
        let donation_id = donation.id;

        let mut donation_repo = MockDonationRepository::new();
        donation_repo.expect_find().returning(move |_| {
            let donation = donation.clone();
            Box::pin(async move { Ok(Some(donation)) })
        });

        let view = usecase(donation_repo, MockPixGateway::new())
            .payment_view(donation_id)
            .await
            .unwrap();

        assert_eq!(view.amount, "R$ 50,00");
    }
}
