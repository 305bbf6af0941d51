use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::subscription_tiers::SubscriptionTier,
    infrastructure::postgres::schema::user_entitlements,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = user_entitlements, primary_key(user_id))]
pub struct UserEntitlementEntity {
    pub user_id: Uuid,
    pub likes_remaining: i32,
    pub super_likes_remaining: i32,
    pub rewind_remaining: i32,
    pub last_reset: DateTime<Utc>,
    pub subscription_tier: String,
    pub tier_expires_at: Option<DateTime<Utc>>,
    pub boost_active: bool,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub streak_days: i32,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = user_entitlements)]
pub struct InsertUserEntitlementEntity {
    pub user_id: Uuid,
    pub likes_remaining: i32,
    pub super_likes_remaining: i32,
    pub rewind_remaining: i32,
    pub last_reset: DateTime<Utc>,
    pub subscription_tier: String,
    pub tier_expires_at: Option<DateTime<Utc>>,
    pub boost_active: bool,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub streak_days: i32,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertUserEntitlementEntity {
    /// Row written on first read: the tier's full allotment and a one-day streak.
    pub fn initial(
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let allotment = tier.allotment();
        Self {
            user_id,
            likes_remaining: allotment.likes,
            super_likes_remaining: allotment.super_likes,
            rewind_remaining: allotment.rewinds,
            last_reset: now,
            subscription_tier: tier.to_string(),
            tier_expires_at,
            boost_active: false,
            boost_expires_at: None,
            streak_days: 1,
            last_login: now,
            created_at: now,
            updated_at: now,
        }
    }
}
