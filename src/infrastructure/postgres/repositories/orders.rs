use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sql, sum};
use diesel::sql_types::BigInt;
use diesel::{Connection, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::orders::{
    InsertOrderEntity, InsertOrderItemEntity, OrderEntity, OrderItemEntity,
};
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::admin_reports::{CollectionTotals, FulfillmentLineDto};
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::orders::UpsertPendingOrder;
use crate::domain::value_objects::payments::{
    ChargeRequest, NewCharge, ORDER_DESCRIPTION, PayableRecord,
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{order_items, orders, users},
};

/// Statuses that still count as the user's one reusable order.
const NON_TERMINAL_STATUSES: [&str; 2] = ["pending", "in_process"];

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    fn to_payable(order: OrderEntity, buyer_name: String, buyer_cpf: String) -> PayableRecord {
        let charge = order.charge();
        PayableRecord {
            id: order.id,
            owner_user_id: Some(order.user_id),
            charge,
            request: ChargeRequest {
                amount_minor: order.total_minor,
                description: ORDER_DESCRIPTION.to_string(),
                payer_name: buyer_name,
                payer_cpf: Some(buyer_cpf),
            },
        }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn upsert_pending_order(&self, order: UpsertPendingOrder) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order_id = conn.transaction::<Uuid, diesel::result::Error, _>(|tx| {
            let existing = orders::table
                .filter(orders::user_id.eq(order.user_id))
                .filter(orders::status.eq_any(NON_TERMINAL_STATUSES))
                .select(orders::id)
                .first::<Uuid>(tx)
                .optional()?;

            let order_id = match existing {
                Some(order_id) => {
                    update(orders::table.find(order_id))
                        .set((
                            orders::total_minor.eq(order.total_minor),
                            orders::payment_id.eq(Some(order.charge.payment_id.clone())),
                            orders::qr_code.eq(order.charge.qr_code.clone()),
                            orders::qr_base64.eq(order.charge.qr_base64.clone()),
                            orders::ticket_url.eq(order.charge.ticket_url.clone()),
                            orders::status.eq(PaymentStatus::Pending.to_string()),
                            orders::paid_at.eq(None::<DateTime<Utc>>),
                        ))
                        .execute(tx)?;
                    delete(order_items::table.filter(order_items::order_id.eq(order_id)))
                        .execute(tx)?;
                    order_id
                }
                None => insert_into(orders::table)
                    .values(&InsertOrderEntity {
                        user_id: order.user_id,
                        total_minor: order.total_minor,
                        payment_id: Some(order.charge.payment_id.clone()),
                        qr_code: order.charge.qr_code.clone(),
                        qr_base64: order.charge.qr_base64.clone(),
                        ticket_url: order.charge.ticket_url.clone(),
                        status: PaymentStatus::Pending.to_string(),
                    })
                    .returning(orders::id)
                    .get_result::<Uuid>(tx)?,
            };

            let rows: Vec<InsertOrderItemEntity> = order
                .items
                .iter()
                .map(|line| InsertOrderItemEntity {
                    order_id,
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    size: line.size.clone(),
                    qty: line.qty,
                    price_minor: line.price_minor,
                })
                .collect();
            insert_into(order_items::table).values(&rows).execute(tx)?;

            Ok(order_id)
        })?;

        Ok(order_id)
    }

    async fn find(&self, id: Uuid) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .find(id)
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderEntity::as_select())
            .order(orders::created_at.desc())
            .load::<OrderEntity>(&mut conn)?;

        Ok(results)
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = order_items::table
            .filter(order_items::order_id.eq(order_id))
            .select(OrderItemEntity::as_select())
            .order(order_items::created_at.asc())
            .load::<OrderItemEntity>(&mut conn)?;

        Ok(results)
    }

    async fn set_status(&self, order_id: Uuid, status: PaymentStatus) -> Result<()> {
        self.persist_status(order_id, status).await
    }

    async fn unresolved_ids(&self) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ids = orders::table
            .filter(orders::payment_id.is_not_null())
            .filter(orders::status.ne(PaymentStatus::Approved.to_string()))
            .select(orders::id)
            .load::<Uuid>(&mut conn)?;

        Ok(ids)
    }

    async fn cancel_pending(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            orders::table
                .filter(orders::user_id.eq(user_id))
                .filter(orders::status.eq_any(NON_TERMINAL_STATUSES)),
        )
        .set((
            orders::status.eq(PaymentStatus::Canceled.to_string()),
            orders::paid_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn purge_unpaid(&self) -> Result<u64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // order_items go with their orders via ON DELETE CASCADE.
        let removed = delete(
            orders::table.filter(orders::status.ne(PaymentStatus::Approved.to_string())),
        )
        .execute(&mut conn)?;

        Ok(removed as u64)
    }

    async fn list_all_with_buyer(&self) -> Result<Vec<(OrderEntity, String)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = orders::table
            .inner_join(users::table)
            .select((OrderEntity::as_select(), users::full_name))
            .order(orders::created_at.desc())
            .load::<(OrderEntity, String)>(&mut conn)?;

        Ok(results)
    }

    async fn fulfillment_tally(&self) -> Result<Vec<FulfillmentLineDto>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = order_items::table
            .inner_join(orders::table)
            .filter(orders::status.eq(PaymentStatus::Approved.to_string()))
            .group_by((
                order_items::product_id,
                order_items::name,
                order_items::size,
            ))
            .select((
                order_items::product_id,
                order_items::name,
                order_items::size,
                sum(order_items::qty),
            ))
            .order((order_items::product_id.asc(), order_items::size.asc()))
            .load::<(String, String, String, Option<i64>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(product_id, name, size, total_qty)| FulfillmentLineDto {
                product_id,
                name,
                size,
                total_qty: total_qty.unwrap_or(0),
            })
            .collect())
    }

    async fn approved_totals(&self) -> Result<CollectionTotals> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let (count, gross_minor) = orders::table
            .filter(orders::status.eq(PaymentStatus::Approved.to_string()))
            .select((
                count_star(),
                sql::<BigInt>("COALESCE(SUM(total_minor), 0)::bigint"),
            ))
            .first::<(i64, i64)>(&mut conn)?;

        Ok(CollectionTotals { count, gross_minor })
    }

    async fn force_approve(&self, order_id: Uuid) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let owner = update(orders::table.find(order_id))
            .set((
                orders::status.eq(PaymentStatus::Approved.to_string()),
                orders::paid_at.eq(Some(Utc::now())),
            ))
            .returning(orders::user_id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(owner)
    }
}

#[async_trait]
impl PayableRepository for OrderPostgres {
    async fn find_payable(&self, id: Uuid) -> Result<Option<PayableRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .inner_join(users::table)
            .filter(orders::id.eq(id))
            .select((OrderEntity::as_select(), users::full_name, users::cpf))
            .first::<(OrderEntity, String, String)>(&mut conn)
            .optional()?;

        Ok(result.map(|(order, name, cpf)| Self::to_payable(order, name, cpf)))
    }

    async fn find_by_payment_id(&self, payment_id: String) -> Result<Option<PayableRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .inner_join(users::table)
            .filter(orders::payment_id.eq(payment_id))
            .select((OrderEntity::as_select(), users::full_name, users::cpf))
            .first::<(OrderEntity, String, String)>(&mut conn)
            .optional()?;

        Ok(result.map(|(order, name, cpf)| Self::to_payable(order, name, cpf)))
    }

    async fn replace_charge(
        &self,
        id: Uuid,
        expected_payment_id: String,
        charge: NewCharge,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            orders::table
                .filter(orders::id.eq(id))
                .filter(orders::payment_id.eq(expected_payment_id)),
        )
        .set((
            orders::payment_id.eq(Some(charge.payment_id)),
            orders::qr_code.eq(charge.qr_code),
            orders::qr_base64.eq(charge.qr_base64),
            orders::ticket_url.eq(charge.ticket_url),
            orders::status.eq(PaymentStatus::Pending.to_string()),
            orders::paid_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn persist_status(&self, id: Uuid, status: PaymentStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let paid_at = status.is_approved().then(Utc::now);
        update(orders::table.find(id))
            .set((
                orders::status.eq(status.to_string()),
                orders::paid_at.eq(paid_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
