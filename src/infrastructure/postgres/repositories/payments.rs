use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn create_pending(
        &self,
        insert_payment_entity: InsertPaymentEntity,
    ) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&insert_payment_entity)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn attach_payment_url(
        &self,
        payment_id: Uuid,
        payment_url: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payments::table)
            .filter(payments::id.eq(payment_id))
            .set((
                payments::payment_url.eq(Some(payment_url)),
                payments::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::id.eq(payment_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::transaction_id.eq(transaction_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn settle(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        external_transaction_id: Option<String>,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
            .set((
                payments::status.eq(status.to_string()),
                payments::external_transaction_id.eq(external_transaction_id),
                payments::completed_at.eq(completed_at),
                payments::updated_at.eq(now),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::user_id.eq(user_id))
            .order(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }
}
