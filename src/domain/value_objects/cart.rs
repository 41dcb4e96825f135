use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_QTY: i32 = 1;
pub const MAX_QTY: i32 = 99;

#[derive(Debug, Clone, Deserialize)]
pub struct AddCartItemModel {
    pub product_id: String,
    pub size: String,
    pub qty: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartItemModel {
    pub size: String,
    pub qty: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CartLineDto {
    pub id: Uuid,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub qty: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<&'static str>,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize)]
pub struct CartViewDto {
    pub ok: bool,
    pub items: Vec<CartLineDto>,
    pub total: String,
    pub total_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct CartCountDto {
    pub ok: bool,
    pub count: i64,
}

/// Absent quantity means one; anything else is clamped into the sold range.
pub fn clamp_qty(qty: Option<i32>) -> i32 {
    qty.unwrap_or(MIN_QTY).clamp(MIN_QTY, MAX_QTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_sold_range() {
        assert_eq!(clamp_qty(None), 1);
        assert_eq!(clamp_qty(Some(0)), 1);
        assert_eq!(clamp_qty(Some(-3)), 1);
        assert_eq!(clamp_qty(Some(42)), 42);
        assert_eq!(clamp_qty(Some(1000)), 99);
    }
}
