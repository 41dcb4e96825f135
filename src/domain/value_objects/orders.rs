use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::payments::NewCharge;

/// One checkout line, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price_minor: i32,
}

/// A checkout about to land on the user's single non-terminal order:
/// either updating the existing one in place or inserting a new one.
#[derive(Debug, Clone)]
pub struct UpsertPendingOrder {
    pub user_id: Uuid,
    pub total_minor: i64,
    pub charge: NewCharge,
    pub items: Vec<NewOrderLine>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub ok: bool,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    pub price: String,
}

/// One approved order in the buyer's purchase history.
#[derive(Debug, Serialize)]
pub struct OrderHistoryDto {
    pub id: Uuid,
    pub total: String,
    pub paid_at: Option<String>,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Serialize)]
pub struct OrderHistoryResponse {
    pub ok: bool,
    pub orders: Vec<OrderHistoryDto>,
}

/// Outcome of the admin-triggered sweep over unresolved orders.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RefreshSummary {
    pub ok: bool,
    pub checked: usize,
    pub approved: usize,
}
