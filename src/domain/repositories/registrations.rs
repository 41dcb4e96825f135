use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::registrations::{
    InsertRegistrationEntity, RegistrationOverviewEntity,
};
use crate::domain::value_objects::registrations::UploadKind;

#[async_trait]
#[automock]
pub trait RegistrationRepository {
    async fn insert(&self, registration: InsertRegistrationEntity) -> Result<Uuid>;

    async fn find_overview(&self, id: Uuid) -> Result<Option<RegistrationOverviewEntity>>;

    async fn find_by_cpf(&self, cpf: String) -> Result<Option<RegistrationOverviewEntity>>;

    /// Loads one stored upload as (bytes, mime).
    async fn find_upload(&self, id: Uuid, kind: UploadKind) -> Result<Option<(Vec<u8>, String)>>;

    async fn list_paid(&self) -> Result<Vec<RegistrationOverviewEntity>>;

    async fn count_paid(&self) -> Result<i64>;
}
