use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{NewCharge, PayableRecord};

/// The payment-field surface shared by registrations, orders and donations.
/// One implementation per owning table; the reconciliation engine only ever
/// talks to this trait.
#[async_trait]
#[automock]
pub trait PayableRepository {
    async fn find_payable(&self, id: Uuid) -> Result<Option<PayableRecord>>;

    async fn find_by_payment_id(&self, payment_id: String) -> Result<Option<PayableRecord>>;

    /// Replaces the stored charge with a fresh one, resetting status to
    /// pending and clearing paid_at. The update only applies while
    /// `expected_payment_id` is still the stored gateway id; returns false
    /// when a concurrent poller already swapped the charge.
    async fn replace_charge(
        &self,
        id: Uuid,
        expected_payment_id: String,
        charge: NewCharge,
    ) -> Result<bool>;

    /// Persists the status, setting paid_at exactly when approved and
    /// clearing it otherwise.
    async fn persist_status(&self, id: Uuid, status: PaymentStatus) -> Result<()>;
}
