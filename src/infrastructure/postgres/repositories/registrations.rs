use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::registrations::{
    InsertRegistrationEntity, RegistrationOverviewEntity,
};
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::repositories::registrations::RegistrationRepository;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{
    ChargeRequest, NewCharge, PayableRecord, REGISTRATION_DESCRIPTION,
};
use crate::domain::value_objects::registrations::UploadKind;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::inscricoes};

pub struct RegistrationPostgres {
    db_pool: Arc<PgPoolSquad>,
    /// Registrations store no amount; recreated charges use the configured
    /// registration fee.
    registration_amount_minor: i64,
}

impl RegistrationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, registration_amount_minor: i64) -> Self {
        Self {
            db_pool,
            registration_amount_minor,
        }
    }

    fn to_payable(&self, registration: RegistrationOverviewEntity) -> PayableRecord {
        let charge = registration.charge();
        PayableRecord {
            id: registration.id,
            owner_user_id: None,
            charge,
            request: ChargeRequest {
                amount_minor: self.registration_amount_minor,
                description: REGISTRATION_DESCRIPTION.to_string(),
                payer_name: registration.full_name,
                payer_cpf: Some(registration.cpf),
            },
        }
    }
}

#[async_trait]
impl RegistrationRepository for RegistrationPostgres {
    async fn insert(&self, registration: InsertRegistrationEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let registration_id = insert_into(inscricoes::table)
            .values(&registration)
            .returning(inscricoes::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(registration_id)
    }

    async fn find_overview(&self, id: Uuid) -> Result<Option<RegistrationOverviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = inscricoes::table
            .find(id)
            .select(RegistrationOverviewEntity::as_select())
            .first::<RegistrationOverviewEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_cpf(&self, cpf: String) -> Result<Option<RegistrationOverviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = inscricoes::table
            .filter(inscricoes::cpf.eq(cpf))
            .select(RegistrationOverviewEntity::as_select())
            .first::<RegistrationOverviewEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_upload(&self, id: Uuid, kind: UploadKind) -> Result<Option<(Vec<u8>, String)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = match kind {
            UploadKind::Document => inscricoes::table
                .find(id)
                .select((inscricoes::document_blob, inscricoes::document_mime))
                .first::<(Vec<u8>, String)>(&mut conn)
                .optional()?,
            UploadKind::Photo => inscricoes::table
                .find(id)
                .select((inscricoes::photo_blob, inscricoes::photo_mime))
                .first::<(Vec<u8>, String)>(&mut conn)
                .optional()?,
            UploadKind::DevotionPhoto => inscricoes::table
                .find(id)
                .select((
                    inscricoes::devotion_photo_blob,
                    inscricoes::devotion_photo_mime,
                ))
                .first::<(Vec<u8>, String)>(&mut conn)
                .optional()?,
        };

        Ok(result)
    }

    async fn list_paid(&self) -> Result<Vec<RegistrationOverviewEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = inscricoes::table
            .filter(inscricoes::status.eq(PaymentStatus::Approved.to_string()))
            .select(RegistrationOverviewEntity::as_select())
            .order(inscricoes::paid_at.desc())
            .load::<RegistrationOverviewEntity>(&mut conn)?;

        Ok(results)
    }

    async fn count_paid(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = inscricoes::table
            .filter(inscricoes::status.eq(PaymentStatus::Approved.to_string()))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        Ok(count)
    }
}

#[async_trait]
impl PayableRepository for RegistrationPostgres {
    async fn find_payable(&self, id: Uuid) -> Result<Option<PayableRecord>> {
        let registration = self.find_overview(id).await?;
        Ok(registration.map(|registration| self.to_payable(registration)))
    }

    async fn find_by_payment_id(&self, payment_id: String) -> Result<Option<PayableRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = inscricoes::table
            .filter(inscricoes::payment_id.eq(payment_id))
            .select(RegistrationOverviewEntity::as_select())
            .first::<RegistrationOverviewEntity>(&mut conn)
            .optional()?;

        Ok(result.map(|registration| self.to_payable(registration)))
    }

    async fn replace_charge(
        &self,
        id: Uuid,
        expected_payment_id: String,
        charge: NewCharge,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            inscricoes::table
                .filter(inscricoes::id.eq(id))
                .filter(inscricoes::payment_id.eq(expected_payment_id)),
        )
        .set((
            inscricoes::payment_id.eq(Some(charge.payment_id)),
            inscricoes::qr_code.eq(charge.qr_code),
            inscricoes::qr_base64.eq(charge.qr_base64),
            inscricoes::ticket_url.eq(charge.ticket_url),
            inscricoes::status.eq(PaymentStatus::Pending.to_string()),
            inscricoes::paid_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn persist_status(&self, id: Uuid, status: PaymentStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let paid_at = status.is_approved().then(Utc::now);
        update(inscricoes::table.find(id))
            .set((
                inscricoes::status.eq(status.to_string()),
                inscricoes::paid_at.eq(paid_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
