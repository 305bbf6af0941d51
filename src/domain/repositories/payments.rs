use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    async fn create_pending(&self, insert_payment_entity: InsertPaymentEntity)
    -> Result<PaymentEntity>;

    async fn attach_payment_url(
        &self,
        payment_id: Uuid,
        payment_url: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>>;

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentEntity>>;

    /// Moves a pending payment to its final status. `None` when it was no longer pending.
    async fn settle(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        external_transaction_id: Option<String>,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PaymentEntity>>;
}
