use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::user_entitlements::{InsertUserEntitlementEntity, UserEntitlementEntity},
    value_objects::enums::{quota_counters::QuotaCounter, subscription_tiers::SubscriptionTier},
};

/// Every mutating call is a single conditional statement so concurrent sessions
/// of the same user cannot over-spend or double-apply a time policy.
#[automock]
#[async_trait]
pub trait UserEntitlementRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserEntitlementEntity>>;

    /// Inserts the row unless one already exists, then returns the stored row.
    async fn insert_if_absent(
        &self,
        insert_entity: InsertUserEntitlementEntity,
    ) -> Result<UserEntitlementEntity>;

    /// Refills the counters from `tier`'s allotment when `last_reset < last_midnight`.
    /// Returns `None` when another session already reset today.
    async fn reset_daily_counters(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
        last_midnight: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>>;

    /// Applies a streak transition if `last_login` still equals `expected_last_login`.
    async fn record_login(
        &self,
        user_id: Uuid,
        expected_last_login: DateTime<Utc>,
        streak_days: i32,
        bonus_likes: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>>;

    /// `counter = counter - 1 WHERE counter > 0`. `None` when nothing was left.
    async fn decrement_counter(
        &self,
        user_id: Uuid,
        counter: QuotaCounter,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>>;

    async fn activate_boost(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<UserEntitlementEntity>;

    /// Drops the boost flag only while `boost_expires_at <= now`. `None` when the
    /// boost is no longer lapsed (re-activated by another session, or already cleared).
    async fn clear_expired_boost(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>>;

    /// Upserts the tier and overwrites all counters with its allotment.
    async fn set_tier(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<UserEntitlementEntity>;
}
