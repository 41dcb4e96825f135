pub mod payment_statuses;
pub mod shirt_sizes;
