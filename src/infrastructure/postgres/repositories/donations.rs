use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sql};
use diesel::sql_types::BigInt;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::donations::{DonationEntity, InsertDonationEntity};
use crate::domain::repositories::donations::DonationRepository;
use crate::domain::repositories::payables::PayableRepository;
use crate::domain::value_objects::admin_reports::CollectionTotals;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::payments::{
    ChargeRequest, DONATION_DESCRIPTION, NewCharge, PayableRecord,
};
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::donations};

pub struct DonationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DonationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    fn to_payable(donation: DonationEntity) -> PayableRecord {
        let charge = donation.charge();
        PayableRecord {
            id: donation.id,
            owner_user_id: None,
            charge,
            request: ChargeRequest {
                amount_minor: donation.amount_minor,
                description: DONATION_DESCRIPTION.to_string(),
                payer_name: donation.donor_name,
                payer_cpf: None,
            },
        }
    }
}

#[async_trait]
impl DonationRepository for DonationPostgres {
    async fn insert(&self, donation: InsertDonationEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let donation_id = insert_into(donations::table)
            .values(&donation)
            .returning(donations::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(donation_id)
    }

    async fn find(&self, id: Uuid) -> Result<Option<DonationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = donations::table
            .find(id)
            .select(DonationEntity::as_select())
            .first::<DonationEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_all(&self) -> Result<Vec<DonationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = donations::table
            .select(DonationEntity::as_select())
            .order(donations::created_at.desc())
            .load::<DonationEntity>(&mut conn)?;

        Ok(results)
    }

    async fn approved_totals(&self) -> Result<CollectionTotals> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let (count, gross_minor) = donations::table
            .filter(donations::status.eq(PaymentStatus::Approved.to_string()))
            .select((
                count_star(),
                sql::<BigInt>("COALESCE(SUM(amount_minor), 0)::bigint"),
            ))
            .first::<(i64, i64)>(&mut conn)?;

        Ok(CollectionTotals { count, gross_minor })
    }
}

#[async_trait]
impl PayableRepository for DonationPostgres {
    async fn find_payable(&self, id: Uuid) -> Result<Option<PayableRecord>> {
        let donation = self.find(id).await?;
        Ok(donation.map(Self::to_payable))
    }

    async fn find_by_payment_id(&self, payment_id: String) -> Result<Option<PayableRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = donations::table
            .filter(donations::payment_id.eq(payment_id))
            .select(DonationEntity::as_select())
            .first::<DonationEntity>(&mut conn)
            .optional()?;

        Ok(result.map(Self::to_payable))
    }

    async fn replace_charge(
        &self,
        id: Uuid,
        expected_payment_id: String,
        charge: NewCharge,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            donations::table
                .filter(donations::id.eq(id))
                .filter(donations::payment_id.eq(expected_payment_id)),
        )
        .set((
            donations::payment_id.eq(Some(charge.payment_id)),
            donations::qr_code.eq(charge.qr_code),
            donations::qr_base64.eq(charge.qr_base64),
            donations::ticket_url.eq(charge.ticket_url),
            donations::status.eq(PaymentStatus::Pending.to_string()),
            donations::paid_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn persist_status(&self, id: Uuid, status: PaymentStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let paid_at = status.is_approved().then(Utc::now);
        update(donations::table.find(id))
            .set((
                donations::status.eq(status.to_string()),
                donations::paid_at.eq(paid_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
