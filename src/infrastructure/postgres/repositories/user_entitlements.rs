use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::user_entitlements::{InsertUserEntitlementEntity, UserEntitlementEntity},
        repositories::user_entitlements::UserEntitlementRepository,
        value_objects::enums::{
            quota_counters::QuotaCounter, subscription_tiers::SubscriptionTier,
        },
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::user_entitlements},
};

pub struct UserEntitlementPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserEntitlementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserEntitlementRepository for UserEntitlementPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_entitlements::table
            .filter(user_entitlements::user_id.eq(user_id))
            .select(UserEntitlementEntity::as_select())
            .first::<UserEntitlementEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn insert_if_absent(
        &self,
        insert_entity: InsertUserEntitlementEntity,
    ) -> Result<UserEntitlementEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(user_entitlements::table)
            .values(&insert_entity)
            .on_conflict(user_entitlements::user_id)
            .do_nothing()
            .execute(&mut conn)?;

        let result = user_entitlements::table
            .filter(user_entitlements::user_id.eq(insert_entity.user_id))
            .select(UserEntitlementEntity::as_select())
            .first::<UserEntitlementEntity>(&mut conn)?;

        Ok(result)
    }

    async fn reset_daily_counters(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
        last_midnight: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let allotment = tier.allotment();

        let result = update(user_entitlements::table)
            .filter(user_entitlements::user_id.eq(user_id))
            .filter(user_entitlements::last_reset.lt(last_midnight))
            .set((
                user_entitlements::likes_remaining.eq(allotment.likes),
                user_entitlements::super_likes_remaining.eq(allotment.super_likes),
                user_entitlements::rewind_remaining.eq(allotment.rewinds),
                user_entitlements::subscription_tier.eq(tier.to_string()),
                user_entitlements::tier_expires_at.eq(tier_expires_at),
                user_entitlements::last_reset.eq(now),
                user_entitlements::updated_at.eq(now),
            ))
            .returning(UserEntitlementEntity::as_returning())
            .get_result::<UserEntitlementEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn record_login(
        &self,
        user_id: Uuid,
        expected_last_login: DateTime<Utc>,
        streak_days: i32,
        bonus_likes: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(user_entitlements::table)
            .filter(user_entitlements::user_id.eq(user_id))
            .filter(user_entitlements::last_login.eq(expected_last_login))
            .set((
                user_entitlements::streak_days.eq(streak_days),
                user_entitlements::likes_remaining
                    .eq(user_entitlements::likes_remaining + bonus_likes),
                user_entitlements::last_login.eq(now),
                user_entitlements::updated_at.eq(now),
            ))
            .returning(UserEntitlementEntity::as_returning())
            .get_result::<UserEntitlementEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn decrement_counter(
        &self,
        user_id: Uuid,
        counter: QuotaCounter,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let target = update(user_entitlements::table)
            .filter(user_entitlements::user_id.eq(user_id));

        let result = match counter {
            QuotaCounter::Likes => target
                .filter(user_entitlements::likes_remaining.gt(0))
                .set((
                    user_entitlements::likes_remaining
                        .eq(user_entitlements::likes_remaining - 1),
                    user_entitlements::updated_at.eq(now),
                ))
                .returning(UserEntitlementEntity::as_returning())
                .get_result::<UserEntitlementEntity>(&mut conn)
                .optional()?,
            QuotaCounter::SuperLikes => target
                .filter(user_entitlements::super_likes_remaining.gt(0))
                .set((
                    user_entitlements::super_likes_remaining
                        .eq(user_entitlements::super_likes_remaining - 1),
                    user_entitlements::updated_at.eq(now),
                ))
                .returning(UserEntitlementEntity::as_returning())
                .get_result::<UserEntitlementEntity>(&mut conn)
                .optional()?,
            QuotaCounter::Rewinds => target
                .filter(user_entitlements::rewind_remaining.gt(0))
                .set((
                    user_entitlements::rewind_remaining
                        .eq(user_entitlements::rewind_remaining - 1),
                    user_entitlements::updated_at.eq(now),
                ))
                .returning(UserEntitlementEntity::as_returning())
                .get_result::<UserEntitlementEntity>(&mut conn)
                .optional()?,
        };

        Ok(result)
    }

    async fn activate_boost(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<UserEntitlementEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(user_entitlements::table)
            .filter(user_entitlements::user_id.eq(user_id))
            .set((
                user_entitlements::boost_active.eq(true),
                user_entitlements::boost_expires_at.eq(Some(expires_at)),
                user_entitlements::updated_at.eq(now),
            ))
            .returning(UserEntitlementEntity::as_returning())
            .get_result::<UserEntitlementEntity>(&mut conn)?;

        Ok(result)
    }

    async fn clear_expired_boost(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<UserEntitlementEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // A NULL expiry never counts as live, so it is cleared too.
        let result = update(user_entitlements::table)
            .filter(user_entitlements::user_id.eq(user_id))
            .filter(user_entitlements::boost_active.eq(true))
            .filter(
                user_entitlements::boost_expires_at
                    .le(now)
                    .or(user_entitlements::boost_expires_at.is_null()),
            )
            .set((
                user_entitlements::boost_active.eq(false),
                user_entitlements::boost_expires_at.eq(None::<DateTime<Utc>>),
                user_entitlements::updated_at.eq(now),
            ))
            .returning(UserEntitlementEntity::as_returning())
            .get_result::<UserEntitlementEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn set_tier(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<UserEntitlementEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let allotment = tier.allotment();

        let result = insert_into(user_entitlements::table)
            .values(&InsertUserEntitlementEntity::initial(
                user_id,
                tier,
                tier_expires_at,
                now,
            ))
            .on_conflict(user_entitlements::user_id)
            .do_update()
            .set((
                user_entitlements::subscription_tier.eq(tier.to_string()),
                user_entitlements::tier_expires_at.eq(tier_expires_at),
                user_entitlements::likes_remaining.eq(allotment.likes),
                user_entitlements::super_likes_remaining.eq(allotment.super_likes),
                user_entitlements::rewind_remaining.eq(allotment.rewinds),
                user_entitlements::updated_at.eq(now),
            ))
            .returning(UserEntitlementEntity::as_returning())
            .get_result::<UserEntitlementEntity>(&mut conn)?;

        Ok(result)
    }
}
