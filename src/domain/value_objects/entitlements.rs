use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::user_entitlements::UserEntitlementEntity,
    value_objects::enums::{quota_counters::QuotaCounter, subscription_tiers::SubscriptionTier},
};

/// Typed view of a `user_entitlements` row. All policy predicates live here and
/// take `now` explicitly so they stay pure.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementModel {
    pub user_id: Uuid,
    pub likes_remaining: i32,
    pub super_likes_remaining: i32,
    pub rewind_remaining: i32,
    pub last_reset: DateTime<Utc>,
    pub subscription_tier: SubscriptionTier,
    pub tier_expires_at: Option<DateTime<Utc>>,
    pub boost_active: bool,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub streak_days: i32,
    pub last_login: DateTime<Utc>,
}

impl From<UserEntitlementEntity> for EntitlementModel {
    fn from(value: UserEntitlementEntity) -> Self {
        Self {
            user_id: value.user_id,
            likes_remaining: value.likes_remaining,
            super_likes_remaining: value.super_likes_remaining,
            rewind_remaining: value.rewind_remaining,
            last_reset: value.last_reset,
            subscription_tier: SubscriptionTier::from_str(&value.subscription_tier)
                .unwrap_or_default(),
            tier_expires_at: value.tier_expires_at,
            boost_active: value.boost_active,
            boost_expires_at: value.boost_expires_at,
            streak_days: value.streak_days,
            last_login: value.last_login,
        }
    }
}

impl EntitlementModel {
    pub fn boost_live(&self, now: DateTime<Utc>) -> bool {
        self.boost_active
            && self
                .boost_expires_at
                .map(|expires_at| now < expires_at)
                .unwrap_or(false)
    }

    /// Flag still set but the window has passed; cleared on the next like.
    pub fn boost_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.boost_active && !self.boost_live(now)
    }

    pub fn boost_seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        match self.boost_expires_at {
            Some(expires_at) if self.boost_live(now) => (expires_at - now).num_seconds(),
            _ => 0,
        }
    }

    pub fn remaining(&self, counter: QuotaCounter) -> i32 {
        match counter {
            QuotaCounter::Likes => self.likes_remaining,
            QuotaCounter::SuperLikes => self.super_likes_remaining,
            QuotaCounter::Rewinds => self.rewind_remaining,
        }
    }

    pub fn can_like(&self, now: DateTime<Utc>) -> bool {
        self.boost_live(now) || self.likes_remaining > 0
    }

    pub fn can_super_like(&self) -> bool {
        self.super_likes_remaining > 0
    }

    pub fn can_rewind(&self) -> bool {
        self.rewind_remaining > 0
    }

    pub fn can_spend(&self, counter: QuotaCounter, now: DateTime<Utc>) -> bool {
        match counter {
            QuotaCounter::Likes => self.can_like(now),
            QuotaCounter::SuperLikes => self.can_super_like(),
            QuotaCounter::Rewinds => self.can_rewind(),
        }
    }

    pub fn needs_daily_reset(&self, last_midnight: DateTime<Utc>) -> bool {
        self.last_reset < last_midnight
    }

    pub fn tier_expired(&self, now: DateTime<Utc>) -> bool {
        self.subscription_tier.is_paid()
            && self
                .tier_expires_at
                .map(|expires_at| expires_at <= now)
                .unwrap_or(false)
    }
}

/// What clients see after every entitlement call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub user_id: Uuid,
    pub likes_remaining: i32,
    pub super_likes_remaining: i32,
    pub rewind_remaining: i32,
    pub subscription_tier: SubscriptionTier,
    pub tier_expires_at: Option<DateTime<Utc>>,
    pub unlimited_likes: bool,
    pub boost_active: bool,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub boost_seconds_remaining: i64,
    pub streak_days: i32,
    pub last_reset: DateTime<Utc>,
    pub can_like: bool,
    pub can_super_like: bool,
    pub can_rewind: bool,
    pub login_bonus_likes: i32,
}

impl EntitlementSnapshot {
    pub fn from_model(model: &EntitlementModel, now: DateTime<Utc>, login_bonus_likes: i32) -> Self {
        let boost_live = model.boost_live(now);
        Self {
            user_id: model.user_id,
            likes_remaining: model.likes_remaining,
            super_likes_remaining: model.super_likes_remaining,
            rewind_remaining: model.rewind_remaining,
            subscription_tier: model.subscription_tier,
            tier_expires_at: model.tier_expires_at,
            unlimited_likes: boost_live || model.subscription_tier.has_unlimited_likes(),
            boost_active: boost_live,
            boost_expires_at: if boost_live { model.boost_expires_at } else { None },
            boost_seconds_remaining: model.boost_seconds_remaining(now),
            streak_days: model.streak_days,
            last_reset: model.last_reset,
            can_like: model.can_like(now),
            can_super_like: model.can_super_like(),
            can_rewind: model.can_rewind(),
            login_bonus_likes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeOutcome {
    pub consumed: bool,
    pub entitlement: EntitlementSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTierRequest {
    pub tier: String,
    pub expires_at: Option<DateTime<Utc>>,
}
