use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::{InsertUserEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn create(&self, user: InsertUserEntity) -> Result<Uuid>;

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;

    async fn find_by_cpf(&self, cpf: String) -> Result<Option<UserEntity>>;
}
