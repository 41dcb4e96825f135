use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::orders::OrderEntity;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::dates;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::money;
use crate::domain::value_objects::orders::{OrderHistoryDto, OrderItemDto, RefreshSummary};
use crate::domain::value_objects::payments::PaymentViewDto;
use crate::usecases::payment_reconciliation::{
    ApprovalSideEffect, PaymentReconciliationUseCase, PixGateway, ReconcileError,
    ReconcileOutcome,
};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct OrderUseCase<O, P, G, E>
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    order_repo: Arc<O>,
    pix_gateway: Arc<G>,
    reconciliation: PaymentReconciliationUseCase<P, G, E>,
}

impl<O, P, G, E> OrderUseCase<O, P, G, E>
where
    O: OrderRepository + Send + Sync + 'static,
    P: PayableRepository + Send + Sync + 'static,
    G: PixGateway + Send + Sync + 'static,
    E: ApprovalSideEffect + Send + Sync + 'static,
{
    pub fn new(
        order_repo: Arc<O>,
        pix_gateway: Arc<G>,
        reconciliation: PaymentReconciliationUseCase<P, G, E>,
    ) -> Self {
        Self {
            order_repo,
            pix_gateway,
            reconciliation,
        }
    }

    pub async fn payment_view(&self, order_id: Uuid) -> Result<PaymentViewDto, OrderError> {
        let order = self
            .order_repo
            .find(order_id)
            .await
            .map_err(OrderError::Internal)?
            .ok_or(OrderError::NotFound)?;

        let charge = order.charge();
        Ok(PaymentViewDto {
            id: order.id,
            qr_code: charge.qr_code,
            qr_base64: charge.qr_base64,
            ticket_url: charge.ticket_url,
            status: charge.status,
            amount: money::format_brl(order.total_minor),
        })
    }

    pub async fn poll_status(&self, order_id: Uuid) -> Result<ReconcileOutcome, ReconcileError> {
        self.reconciliation.reconcile(order_id).await
    }

    /// The buyer's approved purchases. Orders still waiting on the gateway
    /// get one refresh attempt first; gateway failures leave them as they
    /// were.
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<OrderHistoryDto>, OrderError> {
        let orders = self
            .order_repo
            .list_for_user(user_id)
            .await
            .map_err(OrderError::Internal)?;

        let mut history = Vec::new();
        for order in orders {
            let status = self.refresh_unresolved(&order).await;
            if !status.is_approved() {
                continue;
            }

            let items = self
                .order_repo
                .items_for(order.id)
                .await
                .map_err(OrderError::Internal)?;

            history.push(OrderHistoryDto {
                id: order.id,
                total: money::format_brl(order.total_minor),
                paid_at: order.paid_at.map(dates::format_datetime_br),
                items: items
                    .into_iter()
                    .map(|item| OrderItemDto {
                        product_id: item.product_id,
                        name: item.name,
                        size: item.size,
                        qty: item.qty,
                        price: money::format_brl(item.price_minor as i64),
                    })
                    .collect(),
            });
        }

        Ok(history)
    }

    async fn refresh_unresolved(&self, order: &OrderEntity) -> PaymentStatus {
        let charge = order.charge();
        let Some(payment_id) = charge.payment_id else {
            return charge.status;
        };
        if charge.status.is_approved() {
            return charge.status;
        }

        match self.pix_gateway.get_payment(payment_id).await {
            Ok(probe) if !probe.status.is_empty() => {
                let status = PaymentStatus::from_str(&probe.status);
                if let Err(err) = self.order_repo.set_status(order.id, status.clone()).await {
                    warn!(order_id = %order.id, db_error = ?err, "orders: failed to persist refreshed status");
                    return charge.status;
                }
                status
            }
            Ok(_) => charge.status,
            Err(err) => {
                warn!(order_id = %order.id, error = ?err, "orders: status refresh failed, keeping cached status");
                charge.status
            }
        }
    }

    /// Admin-triggered sweep: reconcile every order that still has a
    /// gateway id but no approval. One gateway call per order, no
    /// concurrency limiting; per-row failures are logged and skipped.
    pub async fn refresh_all(&self) -> Result<RefreshSummary, OrderError> {
        let ids = self
            .order_repo
            .unresolved_ids()
            .await
            .map_err(OrderError::Internal)?;

        let checked = ids.len();
        let mut approved = 0;
        for order_id in ids {
            match self.reconciliation.reconcile(order_id).await {
                Ok(outcome) if outcome.paid => approved += 1,
                Ok(_) => {}
                Err(err) => {
                    warn!(%order_id, error = ?err, "orders: refresh sweep failed for order");
                }
            }
        }

        info!(checked, approved, "orders: refresh sweep finished");
        Ok(RefreshSummary {
            ok: true,
            checked,
            approved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::orders::OrderItemEntity;
    use crate::domain::repositories::orders::MockOrderRepository;
    use crate::domain::repositories::payables::MockPayableRepository;
    use crate::domain::value_objects::payments::{ChargeRequest, PayableRecord, PixCharge};
    use crate::payments::pix_client::PixPaymentProbe;
    use crate::usecases::payment_reconciliation::{MockPixGateway, NoApprovalSideEffect};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn order(status: &str, payment_id: Option<&str>) -> OrderEntity {
        OrderEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_minor: 12_600,
            payment_id: payment_id.map(|id| id.to_string()),
            qr_code: Some("qr".to_string()),
            qr_base64: None,
            ticket_url: None,
            status: status.to_string(),
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    fn order_item(order_id: Uuid) -> OrderItemEntity {
        OrderItemEntity {
            id: Uuid::new_v4(),
            order_id,
            product_id: "saints-bw-regular".to_string(),
            name: "Saints B&W Tee (regular)".to_string(),
            size: "M".to_string(),
            qty: 2,
            price_minor: 5800,
            created_at: Utc::now(),
        }
    }

    fn usecase(
        order_repo: MockOrderRepository,
        gateway: MockPixGateway,
        payable_repo: MockPayableRepository,
        engine_gateway: MockPixGateway,
    ) -> OrderUseCase<MockOrderRepository, MockPayableRepository, MockPixGateway, NoApprovalSideEffect>
    {
        let reconciliation = PaymentReconciliationUseCase::new(
            Arc::new(payable_repo),
            Arc::new(engine_gateway),
            Arc::new(NoApprovalSideEffect),
        );
        OrderUseCase::new(Arc::new(order_repo), Arc::new(gateway), reconciliation)
    }

    #[tokio::test]
    async fn history_refreshes_unresolved_orders_and_keeps_only_approved() {
        let already_approved = order("approved", Some("pay-1"));
        let becomes_approved = order("pending", Some("pay-2"));
        let stays_pending = order("pending", Some("pay-3"));
        let approved_ids = [already_approved.id, becomes_approved.id];
        let becomes_approved_id = becomes_approved.id;

        let mut order_repo = MockOrderRepository::new();
        let mut gateway = MockPixGateway::new();

        let orders = vec![
            already_approved.clone(),
            becomes_approved.clone(),
            stays_pending.clone(),
        ];
        order_repo.expect_list_for_user().returning(move |_| {
            let orders = orders.clone();
            Box::pin(async move { Ok(orders) })
        });
        gateway
            .expect_get_payment()
            .with(eq("pay-2".to_string()))
            .returning(|_| {
                Box::pin(async move {
                    Ok(PixPaymentProbe {
                        status: "approved".to_string(),
                        expires_at: None,
                    })
                })
            });
        gateway
            .expect_get_payment()
            .with(eq("pay-3".to_string()))
            .returning(|_| {
                Box::pin(async move {
                    Ok(PixPaymentProbe {
                        status: "pending".to_string(),
                        expires_at: None,
                    })
                })
            });
        order_repo
            .expect_set_status()
            .with(eq(becomes_approved_id), eq(PaymentStatus::Approved))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        order_repo
            .expect_set_status()
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        order_repo.expect_items_for().returning(|order_id| {
            Box::pin(async move { Ok(vec![order_item(order_id)]) })
        });

        let history = usecase(
            order_repo,
            gateway,
            MockPayableRepository::new(),
            MockPixGateway::new(),
        )
        .history(Uuid::new_v4())
        .await
        .unwrap();

        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|entry| approved_ids.contains(&entry.id)));
        assert_eq!(history[0].items[0].price, "R$ 58,00");
    }

    #[tokio::test]
    async fn refresh_all_reconciles_each_unresolved_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_unresolved_ids().returning(move || {
            Box::pin(async move { Ok(vec![first, second]) })
        });

        let mut payable_repo = MockPayableRepository::new();
        let mut engine_gateway = MockPixGateway::new();

        payable_repo.expect_find_payable().returning(|id| {
            Box::pin(async move {
                Ok(Some(PayableRecord {
                    id,
                    owner_user_id: Some(Uuid::new_v4()),
                    charge: PixCharge {
                        payment_id: Some(format!("pay-{id}")),
                        qr_code: None,
                        qr_base64: None,
                        ticket_url: None,
                        status: PaymentStatus::Pending,
                        paid_at: None,
                    },
                    request: ChargeRequest {
                        amount_minor: 5800,
                        description: "Retreat shop order".to_string(),
                        payer_name: "Ana Maria".to_string(),
                        payer_cpf: None,
                    },
                }))
            })
        });
        let approved_payment = format!("pay-{first}");
        engine_gateway.expect_get_payment().returning(move |payment_id| {
            let approved = payment_id == approved_payment;
            Box::pin(async move {
                Ok(PixPaymentProbe {
                    status: if approved { "approved" } else { "pending" }.to_string(),
                    expires_at: None,
                })
            })
        });
        payable_repo
            .expect_persist_status()
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let summary = usecase(
            order_repo,
            MockPixGateway::new(),
            payable_repo,
            engine_gateway,
        )
        .refresh_all()
        .await
        .unwrap();

        assert_eq!(
            summary,
            RefreshSummary {
                ok: true,
                checked: 2,
                approved: 1,
            }
        );
    }

    #[tokio::test]
    async fn payment_view_reports_not_found_for_unknown_orders() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let err = usecase(
            order_repo,
            MockPixGateway::new(),
            MockPayableRepository::new(),
            MockPixGateway::new(),
        )
        .payment_view(Uuid::new_v4())
        .await
        .unwrap_err();

        assert!(matches!(err, OrderError::NotFound));
    }

    #[tokio::test]
    async fn payment_view_formats_the_order_total() {
        let order = order("pending", Some("pay-1"));
        let order_id = order.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_find().returning(move |_| {
            let order = order.clone();
            Box::pin(async move { Ok(Some(order)) })
        });

        let view = usecase(
            order_repo,
            MockPixGateway::new(),
            MockPayableRepository::new(),
            MockPixGateway::new(),
        )
        .payment_view(order_id)
        .await
        .unwrap();

        assert_eq!(view.amount, "R$ 126,00");
        assert_eq!(view.status, PaymentStatus::Pending);
    }
}
