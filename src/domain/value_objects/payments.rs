use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::payments::PaymentEntity,
    value_objects::enums::{payment_statuses::PaymentStatus, subscription_tiers::SubscriptionTier},
};

#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePaymentRequest {
    pub plan: String,
    pub user_id: Uuid,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiatePaymentResponse {
    pub success: bool,
    pub payment_url: String,
    pub transaction_id: String,
}

/// Body posted by either gateway once the customer finished (or abandoned) the payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub reference: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub status: PaymentStatus,
    pub plan: String,
    pub amount: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentHistoryItem {
    pub transaction_id: String,
    pub plan: String,
    pub amount: i32,
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<PaymentEntity> for PaymentHistoryItem {
    fn from(value: PaymentEntity) -> Self {
        Self {
            transaction_id: value.transaction_id,
            plan: value.plan,
            amount: value.amount,
            method: value.method,
            status: PaymentStatus::from_str(&value.status),
            created_at: value.created_at,
            completed_at: value.completed_at,
        }
    }
}

/// What a gateway needs to open a hosted checkout page.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub payment_id: Uuid,
    pub transaction_id: String,
    pub user_id: Uuid,
    pub plan: SubscriptionTier,
    pub amount: i32,
}
