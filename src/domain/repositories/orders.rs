use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::orders::{OrderEntity, OrderItemEntity};
use crate::domain::value_objects::admin_reports::{CollectionTotals, FulfillmentLineDto};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::orders::UpsertPendingOrder;

#[async_trait]
#[automock]
pub trait OrderRepository {
    /// Reuses the user's non-terminal (pending/in_process) order when one
    /// exists, replacing its items, total and payment fields in one
    /// transaction; inserts a fresh order otherwise. Returns the order id.
    async fn upsert_pending_order(&self, order: UpsertPendingOrder) -> Result<Uuid>;

    async fn find(&self, id: Uuid) -> Result<Option<OrderEntity>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderEntity>>;

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>>;

    async fn set_status(&self, order_id: Uuid, status: PaymentStatus) -> Result<()>;

    /// Orders that still have a gateway id but no approval yet.
    async fn unresolved_ids(&self) -> Result<Vec<Uuid>>;

    /// Marks the user's non-terminal order canceled; false when there is
    /// none.
    async fn cancel_pending(&self, user_id: Uuid) -> Result<bool>;

    /// Deletes every non-approved order with its items; returns how many
    /// orders were removed.
    async fn purge_unpaid(&self) -> Result<u64>;

    async fn list_all_with_buyer(&self) -> Result<Vec<(OrderEntity, String)>>;

    async fn fulfillment_tally(&self) -> Result<Vec<FulfillmentLineDto>>;

    async fn approved_totals(&self) -> Result<CollectionTotals>;

    /// Forces an order approved (paid_at = now); returns the owning user id
    /// so the caller can clear that user's cart.
    async fn force_approve(&self, order_id: Uuid) -> Result<Option<Uuid>>;
}
