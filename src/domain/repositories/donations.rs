use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::donations::{DonationEntity, InsertDonationEntity};
use crate::domain::value_objects::admin_reports::CollectionTotals;

#[async_trait]
#[automock]
pub trait DonationRepository {
    async fn insert(&self, donation: InsertDonationEntity) -> Result<Uuid>;

    async fn find(&self, id: Uuid) -> Result<Option<DonationEntity>>;

    async fn list_all(&self) -> Result<Vec<DonationEntity>>;

    async fn approved_totals(&self) -> Result<CollectionTotals>;
}
