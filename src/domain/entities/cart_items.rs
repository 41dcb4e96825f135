use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::cart_items;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cart_items)]
pub struct CartItemEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price_minor: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart_items)]
pub struct InsertCartItemEntity {
    pub user_id: Uuid,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price_minor: i32,
}
