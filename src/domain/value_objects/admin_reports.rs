use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Raw count/gross pair a repository reports for one approved collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTotals {
    pub count: i64,
    pub gross_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct CollectionSummaryDto {
    pub count: i64,
    pub gross_minor: i64,
    pub net_minor: i64,
    pub gross: String,
    pub net: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub registrations: CollectionSummaryDto,
    pub orders: CollectionSummaryDto,
    pub donations: CollectionSummaryDto,
}

#[derive(Debug, Serialize)]
pub struct PaidRegistrationDto {
    pub id: Uuid,
    pub full_name: String,
    pub whatsapp: String,
    pub cpf: String,
    pub paid_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderDto {
    pub id: Uuid,
    pub buyer_name: String,
    pub status: PaymentStatus,
    pub total: String,
    pub net: String,
    pub paid_at: Option<String>,
    pub created_at: String,
}

/// Approved order items grouped by product and size, for fulfillment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FulfillmentLineDto {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub total_qty: i64,
}

#[derive(Debug, Serialize)]
pub struct OrdersOverviewDto {
    pub orders: Vec<AdminOrderDto>,
    pub fulfillment: Vec<FulfillmentLineDto>,
}

#[derive(Debug, Serialize)]
pub struct AdminDonationDto {
    pub id: Uuid,
    pub donor_name: String,
    pub contact: String,
    pub status: PaymentStatus,
    pub amount: String,
    pub net: String,
    pub paid_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonationsOverviewDto {
    pub donations: Vec<AdminDonationDto>,
    pub summary: CollectionSummaryDto,
}

#[derive(Debug, Serialize)]
pub struct PurgeResultDto {
    pub ok: bool,
    pub removed: u64,
}
