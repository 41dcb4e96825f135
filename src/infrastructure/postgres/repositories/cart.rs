use anyhow::Result;
use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::upsert::excluded;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::cart_items::{CartItemEntity, InsertCartItemEntity};
use crate::domain::repositories::cart::CartRepository;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::cart_items};

pub struct CartPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CartPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CartRepository for CartPostgres {
    async fn upsert_item(&self, item: InsertCartItemEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Same (user, product, size) folds into the existing row.
        insert_into(cart_items::table)
            .values(&item)
            .on_conflict((
                cart_items::user_id,
                cart_items::product_id,
                cart_items::size,
            ))
            .do_update()
            .set(cart_items::qty.eq(cart_items::qty + excluded(cart_items::qty)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .select(CartItemEntity::as_select())
            .order(cart_items::created_at.desc())
            .load::<CartItemEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        size: String,
        qty: i32,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .set((cart_items::size.eq(size), cart_items::qty.eq(qty)))
        .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = delete(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .select(sum(cart_items::qty))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }

    async fn clear_for_user(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(cart_items::table.filter(cart_items::user_id.eq(user_id))).execute(&mut conn)?;

        Ok(())
    }
}
