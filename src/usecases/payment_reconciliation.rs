use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repositories::cart::CartRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{ChargeRequest, NewCharge, PayableRecord};
use crate::payments::pix_client::{PixClient, PixPaymentData, PixPaymentProbe};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PixGateway: Send + Sync {
    async fn create_payment(&self, request: ChargeRequest) -> AnyResult<PixPaymentData>;

    async fn get_payment(&self, payment_id: String) -> AnyResult<PixPaymentProbe>;
}

#[async_trait]
impl PixGateway for PixClient {
    async fn create_payment(&self, request: ChargeRequest) -> AnyResult<PixPaymentData> {
        PixClient::create_payment(self, &request).await
    }

    async fn get_payment(&self, payment_id: String) -> AnyResult<PixPaymentProbe> {
        PixClient::get_payment(self, &payment_id).await
    }
}

/// The one domain-specific action run when a payable transitions to
/// approved.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ApprovalSideEffect: Send + Sync {
    async fn on_approved(&self, record: PayableRecord) -> AnyResult<()>;
}

/// Registrations and donations: approval has no side effect.
pub struct NoApprovalSideEffect;

#[async_trait]
impl ApprovalSideEffect for NoApprovalSideEffect {
    async fn on_approved(&self, _record: PayableRecord) -> AnyResult<()> {
        Ok(())
    }
}

/// Orders: an approved payment empties the buyer's cart.
pub struct ClearCartOnApproval<C>
where
    C: CartRepository + Send + Sync + 'static,
{
    cart_repo: Arc<C>,
}

impl<C> ClearCartOnApproval<C>
where
    C: CartRepository + Send + Sync + 'static,
{
    pub fn new(cart_repo: Arc<C>) -> Self {
        Self { cart_repo }
    }
}

#[async_trait]
impl<C> ApprovalSideEffect for ClearCartOnApproval<C>
where
    C: CartRepository + Send + Sync + 'static,
{
    async fn on_approved(&self, record: PayableRecord) -> AnyResult<()> {
        let Some(user_id) = record.owner_user_id else {
            return Ok(());
        };
        info!(
            payable_id = %record.id,
            %user_id,
            "reconcile: payment approved, clearing the buyer's cart"
        );
        self.cart_repo.clear_for_user(user_id).await
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("payable record not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReconcileError::NotFound => StatusCode::NOT_FOUND,
            ReconcileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub status: PaymentStatus,
    pub paid: bool,
    pub recreated: bool,
}

/// Converges one payable row to the gateway's authoritative status.
///
/// The same engine serves registrations, orders and donations; the owning
/// table is behind `PayableRepository` and the approval side effect behind
/// `ApprovalSideEffect`.
pub struct PaymentReconciliationUseCase<P, G, E>
where
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    payable_repo: Arc<P>,
    pix_gateway: Arc<G>,
    side_effect: Arc<E>,
}

impl<P, G, E> PaymentReconciliationUseCase<P, G, E>
where
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    pub fn new(payable_repo: Arc<P>, pix_gateway: Arc<G>, side_effect: Arc<E>) -> Self {
        Self {
            payable_repo,
            pix_gateway,
            side_effect,
        }
    }

    pub async fn reconcile(&self, id: Uuid) -> Result<ReconcileOutcome, ReconcileError> {
        let record = self
            .payable_repo
            .find_payable(id)
            .await
            .map_err(ReconcileError::Internal)?
            .ok_or(ReconcileError::NotFound)?;

        let cached_status = record.charge.status.clone();
        let mut status = cached_status.clone();
        let mut recreated = false;

        if let Some(payment_id) = record.charge.payment_id.clone() {
            // Fail-open: a gateway hiccup keeps the cached status and never
            // fails the surrounding request.
            match self.probe_gateway(&record, payment_id).await {
                Ok((observed, charge_recreated)) => {
                    status = observed;
                    recreated = charge_recreated;
                }
                Err(err) => {
                    warn!(
                        payable_id = %id,
                        error = ?err,
                        "reconcile: gateway poll failed, keeping cached status"
                    );
                }
            }
        }

        if status.is_approved() && !cached_status.is_approved() {
            self.side_effect
                .on_approved(record.clone())
                .await
                .map_err(ReconcileError::Internal)?;
        }

        self.payable_repo
            .persist_status(id, status.clone())
            .await
            .map_err(ReconcileError::Internal)?;

        Ok(ReconcileOutcome {
            paid: status.is_approved(),
            status,
            recreated,
        })
    }

    async fn probe_gateway(
        &self,
        record: &PayableRecord,
        payment_id: String,
    ) -> AnyResult<(PaymentStatus, bool)> {
        let probe = self.pix_gateway.get_payment(payment_id.clone()).await?;

        let status = if probe.status.is_empty() {
            record.charge.status.clone()
        } else {
            PaymentStatus::from_str(&probe.status)
        };

        let expired = status.is_expired()
            || probe.expires_at.map(|at| Utc::now() > at).unwrap_or(false);

        if !expired || status.is_approved() {
            return Ok((status, false));
        }

        info!(
            payable_id = %record.id,
            "reconcile: PIX code expired, creating a replacement charge"
        );
        let fresh = self.pix_gateway.create_payment(record.request.clone()).await?;
        let swapped = self
            .payable_repo
            .replace_charge(record.id, payment_id, NewCharge::from(fresh))
            .await?;

        if !swapped {
            info!(
                payable_id = %record.id,
                "reconcile: a concurrent poller already replaced the charge"
            );
            return Ok((PaymentStatus::Pending, false));
        }

        Ok((PaymentStatus::Pending, true))
    }
}
