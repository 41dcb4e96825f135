use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::PixCharge;
use crate::infrastructure::postgres::schema::{order_items, orders};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_minor: i64,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderEntity {
    pub fn charge(&self) -> PixCharge {
        PixCharge {
            payment_id: self.payment_id.clone(),
            qr_code: self.qr_code.clone(),
            qr_base64: self.qr_base64.clone(),
            ticket_url: self.ticket_url.clone(),
            status: PaymentStatus::from_str(&self.status),
            paid_at: self.paid_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub user_id: Uuid,
    pub total_minor: i64,
    pub payment_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = order_items)]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price_minor: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub struct InsertOrderItemEntity {
    pub order_id: Uuid,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price_minor: i32,
}
