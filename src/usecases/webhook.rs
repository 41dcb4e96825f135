use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::PayableRecord;
use crate::usecases::payment_reconciliation::{ApprovalSideEffect, PixGateway};

/// Handles gateway notifications: one lookup of the owning record across
/// the three payable tables, one status write. Never fails outward — the
/// provider expects a 200 no matter what happened internally.
pub struct WebhookUseCase<R, D, O, G, E>
where
    R: PayableRepository + Send + Sync + 'static,
    D: PayableRepository + Send + Sync + 'static,
    O: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    registration_payables: Arc<R>,
    donation_payables: Arc<D>,
    order_payables: Arc<O>,
    pix_gateway: Arc<G>,
    order_side_effect: Arc<E>,
}

impl<R, D, O, G, E> WebhookUseCase<R, D, O, G, E>
where
    R: PayableRepository + Send + Sync + 'static,
    D: PayableRepository + Send + Sync + 'static,
    O: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    pub fn new(
        registration_payables: Arc<R>,
        donation_payables: Arc<D>,
        order_payables: Arc<O>,
        pix_gateway: Arc<G>,
        order_side_effect: Arc<E>,
    ) -> Self {
        Self {
            registration_payables,
            donation_payables,
            order_payables,
            pix_gateway,
            order_side_effect,
        }
    }

    pub async fn notify(&self, payment_id: Option<String>) {
        let Some(payment_id) = payment_id.filter(|id| !id.is_empty()) else {
            return;
        };

        let status = match self.pix_gateway.get_payment(payment_id.clone()).await {
            Ok(probe) if !probe.status.is_empty() => PaymentStatus::from_str(&probe.status),
            Ok(_) => PaymentStatus::Pending,
            Err(err) => {
                warn!(%payment_id, error = ?err, "webhook: gateway lookup failed, notification dropped");
                return;
            }
        };

        info!(%payment_id, status = %status, "webhook: notification received");

        if self
            .apply_to(&*self.registration_payables, &payment_id, &status, false)
            .await
        {
            return;
        }
        if self
            .apply_to(&*self.donation_payables, &payment_id, &status, false)
            .await
        {
            return;
        }
        self.apply_to(&*self.order_payables, &payment_id, &status, true)
            .await;
    }

    /// Returns true when the record owning `payment_id` lives in this
    /// table (found and handled, or lookup failed and the notification is
    /// dropped).
    async fn apply_to<P>(
        &self,
        payables: &P,
        payment_id: &str,
        status: &PaymentStatus,
        with_side_effect: bool,
    ) -> bool
    where
        P: PayableRepository + Send + Sync,
    {
        let record = match payables.find_by_payment_id(payment_id.to_string()).await {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(err) => {
                warn!(%payment_id, error = ?err, "webhook: payable lookup failed, notification dropped");
                return true;
            }
        };

        if let Err(err) = payables.persist_status(record.id, status.clone()).await {
            warn!(
                payable_id = %record.id,
                error = ?err,
                "webhook: failed to persist notified status"
            );
            return true;
        }

        if with_side_effect {
            self.run_side_effect(record, status).await;
        }
        true
    }

    async fn run_side_effect(&self, record: PayableRecord, status: &PaymentStatus) {
        let was_approved = record.charge.status.is_approved();
        if !status.is_approved() || was_approved {
            return;
        }
        if let Err(err) = self.order_side_effect.on_approved(record.clone()).await {
            warn!(
                payable_id = %record.id,
                error = ?err,
                "webhook: approval side effect failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::payables::MockPayableRepository;
    use crate::domain::value_objects::payments::{ChargeRequest, PixCharge};
    use crate::payments::pix_client::PixPaymentProbe;
    use crate::usecases::payment_reconciliation::{MockApprovalSideEffect, MockPixGateway};
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn record(status: PaymentStatus, payment_id: &str) -> PayableRecord {
        PayableRecord {
            id: Uuid::new_v4(),
            owner_user_id: Some(Uuid::new_v4()),
            charge: PixCharge {
                payment_id: Some(payment_id.to_string()),
                qr_code: None,
                qr_base64: None,
                ticket_url: None,
                status,
                paid_at: None,
            },
            request: ChargeRequest {
                amount_minor: 5800,
                description: "Retreat shop order".to_string(),
                payer_name: "Ana Maria".to_string(),
                payer_cpf: None,
            },
        }
    }

    fn none_repo() -> MockPayableRepository {
        let mut repo = MockPayableRepository::new();
        repo.expect_find_by_payment_id()
            .returning(|_| Box::pin(async move { Ok(None) }));
        repo
    }

    fn approving_gateway() -> MockPixGateway {
        let mut gateway = MockPixGateway::new();
        gateway.expect_get_payment().returning(|_| {
            Box::pin(async move {
                Ok(PixPaymentProbe {
                    status: "approved".to_string(),
                    expires_at: None,
                })
            })
        });
        gateway
    }

    #[tokio::test]
    async fn order_approval_transition_runs_the_clear_cart_side_effect() {
        let found = record(PaymentStatus::Pending, "pay-1");
        let record_id = found.id;

        let mut order_repo = MockPayableRepository::new();
        let mut side_effect = MockApprovalSideEffect::new();

        order_repo
            .expect_find_by_payment_id()
            .with(eq("pay-1".to_string()))
            .returning(move |_| {
                let found = found.clone();
                Box::pin(async move { Ok(Some(found)) })
            });
        order_repo
            .expect_persist_status()
            .with(eq(record_id), eq(PaymentStatus::Approved))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        side_effect
            .expect_on_approved()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(()) }));

        WebhookUseCase::new(
            Arc::new(none_repo()),
            Arc::new(none_repo()),
            Arc::new(order_repo),
            Arc::new(approving_gateway()),
            Arc::new(side_effect),
        )
        .notify(Some("pay-1".to_string()))
        .await;
    }

    #[tokio::test]
    async fn already_approved_order_gets_no_side_effect() {
        let found = record(PaymentStatus::Approved, "pay-1");

        let mut order_repo = MockPayableRepository::new();
        order_repo.expect_find_by_payment_id().returning(move |_| {
            let found = found.clone();
            Box::pin(async move { Ok(Some(found)) })
        });
        order_repo
            .expect_persist_status()
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        // MockApprovalSideEffect with no expectation panics when called.
        WebhookUseCase::new(
            Arc::new(none_repo()),
            Arc::new(none_repo()),
            Arc::new(order_repo),
            Arc::new(approving_gateway()),
            Arc::new(MockApprovalSideEffect::new()),
        )
        .notify(Some("pay-1".to_string()))
        .await;
    }

    #[tokio::test]
    async fn registration_match_stops_the_lookup_chain() {
        let found = record(PaymentStatus::Pending, "pay-1");
        let record_id = found.id;

        let mut registration_repo = MockPayableRepository::new();
        registration_repo
            .expect_find_by_payment_id()
            .returning(move |_| {
                let found = found.clone();
                Box::pin(async move { Ok(Some(found)) })
            });
        registration_repo
            .expect_persist_status()
            .with(eq(record_id), eq(PaymentStatus::Approved))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        // Donation and order repos have no expectations; reaching them
        // would panic the test.
        WebhookUseCase::new(
            Arc::new(registration_repo),
            Arc::new(MockPayableRepository::new()),
            Arc::new(MockPayableRepository::new()),
            Arc::new(approving_gateway()),
            Arc::new(MockApprovalSideEffect::new()),
        )
        .notify(Some("pay-1".to_string()))
        .await;
    }

    #[tokio::test]
    async fn missing_id_and_gateway_failure_are_swallowed() {
        let mut failing_gateway = MockPixGateway::new();
        failing_gateway
            .expect_get_payment()
            .returning(|_| Box::pin(async move { Err(anyhow::anyhow!("gateway down")) }));

        let usecase = WebhookUseCase::new(
            Arc::new(MockPayableRepository::new()),
            Arc::new(MockPayableRepository::new()),
            Arc::new(MockPayableRepository::new()),
            Arc::new(failing_gateway),
            Arc::new(MockApprovalSideEffect::new()),
        );

        usecase.notify(None).await;
        usecase.notify(Some(String::new())).await;
        usecase.notify(Some("pay-1".to_string())).await;
    }
}
