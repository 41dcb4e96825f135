use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::cart_items::{CartItemEntity, InsertCartItemEntity};

#[async_trait]
#[automock]
pub trait CartRepository {
    /// Adds the item, folding it into an existing (user, product, size) row
    /// by summing quantities instead of inserting a duplicate.
    async fn upsert_item(&self, item: InsertCartItemEntity) -> Result<()>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartItemEntity>>;

    async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        size: String,
        qty: i32,
    ) -> Result<bool>;

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool>;

    /// Total quantity across the user's cart.
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64>;

    async fn clear_for_user(&self, user_id: Uuid) -> Result<()>;
}
