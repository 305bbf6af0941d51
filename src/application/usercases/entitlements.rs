use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    clock::Clock,
    entities::user_entitlements::{InsertUserEntitlementEntity, UserEntitlementEntity},
    repositories::user_entitlements::UserEntitlementRepository,
    value_objects::{
        daily_policy::{boost_expiry, evaluate_login_streak, last_local_midnight},
        entitlements::{ConsumeOutcome, EntitlementModel, EntitlementSnapshot},
        enums::{quota_counters::QuotaCounter, subscription_tiers::SubscriptionTier},
    },
};

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("unknown subscription tier: {0}")]
    InvalidTier(String),
    #[error("only the service role may change subscription tiers")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EntitlementError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EntitlementError::InvalidTier(_) => StatusCode::BAD_REQUEST,
            EntitlementError::Forbidden => StatusCode::FORBIDDEN,
            EntitlementError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, EntitlementError>;

/// Daily likes / super-likes / rewinds engine. Time policies (midnight reset,
/// login streak, boost expiry) are evaluated when a record is read.
pub struct EntitlementUseCase<T>
where
    T: UserEntitlementRepository + Send + Sync,
{
    entitlement_repository: Arc<T>,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
}

impl<T> EntitlementUseCase<T>
where
    T: UserEntitlementRepository + Send + Sync,
{
    pub fn new(entitlement_repository: Arc<T>, clock: Arc<dyn Clock>, utc_offset: FixedOffset) -> Self {
        Self {
            entitlement_repository,
            clock,
            utc_offset,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn load(&self, user_id: Uuid) -> UseCaseResult<EntitlementSnapshot> {
        let (model, login_bonus) = self.refresh(user_id).await?;
        Ok(EntitlementSnapshot::from_model(&model, self.now(), login_bonus))
    }

    pub async fn consume_like(&self, user_id: Uuid) -> UseCaseResult<ConsumeOutcome> {
        self.consume(user_id, QuotaCounter::Likes).await
    }

    pub async fn consume_super_like(&self, user_id: Uuid) -> UseCaseResult<ConsumeOutcome> {
        self.consume(user_id, QuotaCounter::SuperLikes).await
    }

    pub async fn consume_rewind(&self, user_id: Uuid) -> UseCaseResult<ConsumeOutcome> {
        self.consume(user_id, QuotaCounter::Rewinds).await
    }

    /// Spends one unit of `counter`. `consumed == false` leaves the record untouched
    /// and the caller must not register the action it was paying for.
    pub async fn consume(
        &self,
        user_id: Uuid,
        counter: QuotaCounter,
    ) -> UseCaseResult<ConsumeOutcome> {
        let (mut model, login_bonus) = self.refresh(user_id).await?;
        let now = self.now();

        if counter == QuotaCounter::Likes {
            if model.boost_lapsed(now) {
                model = self.clear_expired_boost(user_id, model, now).await?;
            }

            if model.boost_live(now) {
                info!(%user_id, "entitlements: like covered by active boost");
                return Ok(Self::outcome(true, &model, now, login_bonus));
            }
        }

        if !model.can_spend(counter, now) {
            info!(%user_id, %counter, "entitlements: quota exhausted");
            return Ok(Self::outcome(false, &model, now, login_bonus));
        }

        let updated = self
            .entitlement_repository
            .decrement_counter(user_id, counter, now)
            .await
            .map_err(|err| {
                error!(%user_id, %counter, db_error = ?err, "entitlements: failed to decrement counter");
                EntitlementError::Internal(err)
            })?;

        match updated {
            Some(entity) => {
                let model = EntitlementModel::from(entity);
                info!(
                    %user_id,
                    %counter,
                    remaining = model.remaining(counter),
                    "entitlements: counter consumed"
                );
                Ok(Self::outcome(true, &model, now, login_bonus))
            }
            None => {
                warn!(
                    %user_id,
                    %counter,
                    "entitlements: counter drained by a concurrent session"
                );
                let model = self.reload(user_id).await?.unwrap_or(model);
                Ok(Self::outcome(false, &model, now, login_bonus))
            }
        }
    }

    pub async fn activate_boost(&self, user_id: Uuid) -> UseCaseResult<EntitlementSnapshot> {
        self.refresh(user_id).await?;
        let now = self.now();
        let expires_at = boost_expiry(now);

        let entity = self
            .entitlement_repository
            .activate_boost(user_id, expires_at, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to activate boost");
                EntitlementError::Internal(err)
            })?;

        info!(%user_id, %expires_at, "entitlements: boost activated");
        Ok(EntitlementSnapshot::from_model(&entity.into(), now, 0))
    }

    /// Switches tier and refills every counter to the new allotment, without proration.
    pub async fn update_subscription_tier(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        tier_expires_at: Option<DateTime<Utc>>,
    ) -> UseCaseResult<EntitlementSnapshot> {
        let now = self.now();
        let tier_expires_at = if tier.is_paid() { tier_expires_at } else { None };

        let entity = self
            .entitlement_repository
            .set_tier(user_id, tier, tier_expires_at, now)
            .await
            .map_err(|err| {
                error!(%user_id, %tier, db_error = ?err, "entitlements: failed to update tier");
                EntitlementError::Internal(err)
            })?;

        info!(%user_id, %tier, expires_at = ?tier_expires_at, "entitlements: subscription tier updated");
        Ok(EntitlementSnapshot::from_model(&entity.into(), now, 0))
    }

    /// Loads (or lazily creates) the record and applies the daily reset and the
    /// login streak. Returns the record and the bonus likes granted by this read.
    async fn refresh(&self, user_id: Uuid) -> UseCaseResult<(EntitlementModel, i32)> {
        let now = self.now();
        let mut model = self.load_or_create(user_id, now).await?;

        let last_midnight = last_local_midnight(now, self.utc_offset);
        if model.needs_daily_reset(last_midnight) {
            let (tier, tier_expires_at) = if model.tier_expired(now) {
                info!(
                    %user_id,
                    tier = %model.subscription_tier,
                    "entitlements: paid tier expired, downgrading to free"
                );
                (SubscriptionTier::Free, None)
            } else {
                (model.subscription_tier, model.tier_expires_at)
            };

            let reset = self
                .entitlement_repository
                .reset_daily_counters(user_id, tier, tier_expires_at, last_midnight, now)
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "entitlements: daily reset failed");
                    EntitlementError::Internal(err)
                })?;

            model = match reset {
                Some(entity) => {
                    info!(%user_id, %tier, "entitlements: daily counters reset");
                    entity.into()
                }
                None => self.reload(user_id).await?.unwrap_or(model),
            };
        }

        let mut login_bonus = 0;
        if let Some(outcome) =
            evaluate_login_streak(model.streak_days, model.last_login, now, self.utc_offset)
        {
            let recorded = self
                .entitlement_repository
                .record_login(
                    user_id,
                    model.last_login,
                    outcome.streak_days,
                    outcome.bonus_likes,
                    now,
                )
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "entitlements: failed to record login streak");
                    EntitlementError::Internal(err)
                })?;

            model = match recorded {
                Some(entity) => {
                    login_bonus = outcome.bonus_likes;
                    info!(
                        %user_id,
                        streak_days = outcome.streak_days,
                        bonus_likes = outcome.bonus_likes,
                        "entitlements: login streak recorded"
                    );
                    entity.into()
                }
                None => self.reload(user_id).await?.unwrap_or(model),
            };
        }

        Ok((model, login_bonus))
    }

    /// Current record without applying any time policy.
    pub async fn find_record(&self, user_id: Uuid) -> UseCaseResult<Option<EntitlementModel>> {
        self.reload(user_id).await
    }

    /// Lazy boost expiry. The write only lands while the boost is still lapsed in
    /// the store; otherwise the stored row (possibly a fresh boost) wins.
    async fn clear_expired_boost(
        &self,
        user_id: Uuid,
        observed: EntitlementModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<EntitlementModel> {
        let cleared = self
            .entitlement_repository
            .clear_expired_boost(user_id, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to clear expired boost");
                EntitlementError::Internal(err)
            })?;

        match cleared {
            Some(entity) => {
                info!(%user_id, "entitlements: expired boost cleared");
                Ok(entity.into())
            }
            None => {
                info!(%user_id, "entitlements: boost changed by another session, reloading");
                Ok(self.reload(user_id).await?.unwrap_or(observed))
            }
        }
    }

    async fn load_or_create(&self, user_id: Uuid, now: DateTime<Utc>) -> UseCaseResult<EntitlementModel> {
        if let Some(model) = self.reload(user_id).await? {
            return Ok(model);
        }

        info!(%user_id, "entitlements: creating initial free record");
        let entity = self
            .entitlement_repository
            .insert_if_absent(InsertUserEntitlementEntity::initial(
                user_id,
                SubscriptionTier::Free,
                None,
                now,
            ))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to create record");
                EntitlementError::Internal(err)
            })?;

        Ok(entity.into())
    }

    async fn reload(&self, user_id: Uuid) -> UseCaseResult<Option<EntitlementModel>> {
        let entity: Option<UserEntitlementEntity> = self
            .entitlement_repository
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to load record");
                EntitlementError::Internal(err)
            })?;
        Ok(entity.map(EntitlementModel::from))
    }

    fn outcome(
        consumed: bool,
        model: &EntitlementModel,
        now: DateTime<Utc>,
        login_bonus: i32,
    ) -> ConsumeOutcome {
        ConsumeOutcome {
            consumed,
            entitlement: EntitlementSnapshot::from_model(model, now, login_bonus),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{
        repositories::user_entitlements::MockUserEntitlementRepository,
        value_objects::{
            daily_policy::{STREAK_BONUS_LIKES, WEEKLY_STREAK_BONUS_LIKES},
            enums::subscription_tiers::UNLIMITED,
        },
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;
    use std::{collections::HashMap, sync::Mutex};

    pub(crate) struct FixedClock(pub Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub(crate) fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        pub(crate) fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Row store that honours the conditional-update contract of the repository.
    #[derive(Default)]
    pub(crate) struct InMemoryEntitlements {
        pub(crate) rows: Mutex<HashMap<Uuid, UserEntitlementEntity>>,
        pub(crate) resets: Mutex<u32>,
    }

    impl InMemoryEntitlements {
        pub(crate) fn with_row(row: UserEntitlementEntity) -> Arc<Self> {
            let store = Self::default();
            store.rows.lock().unwrap().insert(row.user_id, row);
            Arc::new(store)
        }

        pub(crate) fn row(&self, user_id: Uuid) -> UserEntitlementEntity {
            self.rows.lock().unwrap().get(&user_id).cloned().unwrap()
        }

        fn modify<F>(&self, user_id: Uuid, f: F) -> Option<UserEntitlementEntity>
        where
            F: FnOnce(&mut UserEntitlementEntity) -> bool,
        {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.get_mut(&user_id)?;
            if f(row) { Some(row.clone()) } else { None }
        }
    }

    #[async_trait]
    impl UserEntitlementRepository for InMemoryEntitlements {
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserEntitlementEntity>> {
            Ok(self.rows.lock().unwrap().get(&user_id).cloned())
        }

        async fn insert_if_absent(
            &self,
            insert_entity: InsertUserEntitlementEntity,
        ) -> Result<UserEntitlementEntity> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .entry(insert_entity.user_id)
                .or_insert_with(|| entity_from_insert(insert_entity));
            Ok(row.clone())
        }

        async fn reset_daily_counters(
            &self,
            user_id: Uuid,
            tier: SubscriptionTier,
            tier_expires_at: Option<DateTime<Utc>>,
            last_midnight: DateTime<Utc>,
            now: DateTime<Utc>,
        ) -> Result<Option<UserEntitlementEntity>> {
            let updated = self.modify(user_id, |row| {
                if row.last_reset >= last_midnight {
                    return false;
                }
                let allotment = tier.allotment();
                row.likes_remaining = allotment.likes;
                row.super_likes_remaining = allotment.super_likes;
                row.rewind_remaining = allotment.rewinds;
                row.subscription_tier = tier.to_string();
                row.tier_expires_at = tier_expires_at;
                row.last_reset = now;
                true
            });
            if updated.is_some() {
                *self.resets.lock().unwrap() += 1;
            }
            Ok(updated)
        }

        async fn record_login(
            &self,
            user_id: Uuid,
            expected_last_login: DateTime<Utc>,
            streak_days: i32,
            bonus_likes: i32,
            now: DateTime<Utc>,
        ) -> Result<Option<UserEntitlementEntity>> {
            Ok(self.modify(user_id, |row| {
                if row.last_login != expected_last_login {
                    return false;
                }
                row.streak_days = streak_days;
                row.likes_remaining += bonus_likes;
                row.last_login = now;
                true
            }))
        }

        async fn decrement_counter(
            &self,
            user_id: Uuid,
            counter: QuotaCounter,
            now: DateTime<Utc>,
        ) -> Result<Option<UserEntitlementEntity>> {
            Ok(self.modify(user_id, |row| {
                let slot = match counter {
                    QuotaCounter::Likes => &mut row.likes_remaining,
                    QuotaCounter::SuperLikes => &mut row.super_likes_remaining,
                    QuotaCounter::Rewinds => &mut row.rewind_remaining,
                };
                if *slot <= 0 {
                    return false;
                }
                *slot -= 1;
                row.updated_at = now;
                true
            }))
        }

        async fn activate_boost(
            &self,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
            now: DateTime<Utc>,
        ) -> Result<UserEntitlementEntity> {
            self.modify(user_id, |row| {
                row.boost_active = true;
                row.boost_expires_at = Some(expires_at);
                row.updated_at = now;
                true
            })
            .ok_or_else(|| anyhow::anyhow!("no entitlement row"))
        }

        async fn clear_expired_boost(
            &self,
            user_id: Uuid,
            now: DateTime<Utc>,
        ) -> Result<Option<UserEntitlementEntity>> {
            Ok(self.modify(user_id, |row| {
                let lapsed = row.boost_expires_at.is_none_or(|expires_at| expires_at <= now);
                if !row.boost_active || !lapsed {
                    return false;
                }
                row.boost_active = false;
                row.boost_expires_at = None;
                row.updated_at = now;
                true
            }))
        }

        async fn set_tier(
            &self,
            user_id: Uuid,
            tier: SubscriptionTier,
            tier_expires_at: Option<DateTime<Utc>>,
            now: DateTime<Utc>,
        ) -> Result<UserEntitlementEntity> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.entry(user_id).or_insert_with(|| {
                entity_from_insert(InsertUserEntitlementEntity::initial(
                    user_id,
                    tier,
                    tier_expires_at,
                    now,
                ))
            });
            let allotment = tier.allotment();
            row.subscription_tier = tier.to_string();
            row.tier_expires_at = tier_expires_at;
            row.likes_remaining = allotment.likes;
            row.super_likes_remaining = allotment.super_likes;
            row.rewind_remaining = allotment.rewinds;
            row.updated_at = now;
            Ok(row.clone())
        }
    }

    pub(crate) fn entity_from_insert(insert: InsertUserEntitlementEntity) -> UserEntitlementEntity {
        UserEntitlementEntity {
            user_id: insert.user_id,
            likes_remaining: insert.likes_remaining,
            super_likes_remaining: insert.super_likes_remaining,
            rewind_remaining: insert.rewind_remaining,
            last_reset: insert.last_reset,
            subscription_tier: insert.subscription_tier,
            tier_expires_at: insert.tier_expires_at,
            boost_active: insert.boost_active,
            boost_expires_at: insert.boost_expires_at,
            streak_days: insert.streak_days,
            last_login: insert.last_login,
            created_at: insert.created_at,
            updated_at: insert.updated_at,
        }
    }

    pub(crate) fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    /// A row that was already reset and logged in today, so `refresh` is a no-op.
    pub(crate) fn fresh_row(user_id: Uuid, now: DateTime<Utc>) -> UserEntitlementEntity {
        entity_from_insert(InsertUserEntitlementEntity::initial(
            user_id,
            SubscriptionTier::Free,
            None,
            now,
        ))
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn usecase<R>(repo: Arc<R>, clock: Arc<FixedClock>) -> EntitlementUseCase<R>
    where
        R: UserEntitlementRepository + Send + Sync,
    {
        EntitlementUseCase::new(repo, clock, utc())
    }

    #[tokio::test]
    async fn first_load_creates_free_record() {
        let user_id = Uuid::new_v4();
        let repo = Arc::new(InMemoryEntitlements::default());
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(snapshot.subscription_tier, SubscriptionTier::Free);
        assert_eq!(snapshot.likes_remaining, 30);
        assert_eq!(snapshot.super_likes_remaining, 1);
        assert_eq!(snapshot.rewind_remaining, 0);
        assert_eq!(snapshot.streak_days, 1);
        assert_eq!(snapshot.login_bonus_likes, 0);
        assert_eq!(*repo.resets.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn consume_like_decrements_by_one() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 5;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let outcome = engine.consume_like(user_id).await.unwrap();

        assert!(outcome.consumed);
        assert_eq!(outcome.entitlement.likes_remaining, 4);
        assert_eq!(repo.row(user_id).likes_remaining, 4);
    }

    #[tokio::test]
    async fn consume_like_fails_closed_at_zero() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 0;

        let mut repo = MockUserEntitlementRepository::new();
        repo.expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(row.clone())));
        repo.expect_decrement_counter().times(0);
        repo.expect_clear_expired_boost().times(0);

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let outcome = engine.consume_like(user_id).await.unwrap();

        assert!(!outcome.consumed);
        assert_eq!(outcome.entitlement.likes_remaining, 0);
        assert!(!outcome.entitlement.can_like);
    }

    #[tokio::test]
    async fn live_boost_covers_likes_without_spending() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 0;
        row.boost_active = true;
        row.boost_expires_at = Some(noon() + Duration::minutes(5));

        let mut repo = MockUserEntitlementRepository::new();
        repo.expect_find_by_user_id()
            .returning(move |_| Ok(Some(row.clone())));
        repo.expect_decrement_counter().times(0);

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let outcome = engine.consume_like(user_id).await.unwrap();

        assert!(outcome.consumed);
        assert!(outcome.entitlement.unlimited_likes);
        assert_eq!(outcome.entitlement.likes_remaining, 0);
    }

    #[tokio::test]
    async fn expired_boost_is_cleared_then_counter_used() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 2;
        row.boost_active = true;
        row.boost_expires_at = Some(noon() - Duration::minutes(1));
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let outcome = engine.consume_like(user_id).await.unwrap();

        assert!(outcome.consumed);
        let stored = repo.row(user_id);
        assert!(!stored.boost_active);
        assert_eq!(stored.boost_expires_at, None);
        assert_eq!(stored.likes_remaining, 1);
    }

    #[tokio::test]
    async fn boost_reactivated_by_another_session_survives_lazy_expiry() {
        let user_id = Uuid::new_v4();
        let mut lapsed = fresh_row(user_id, noon());
        lapsed.likes_remaining = 3;
        lapsed.boost_active = true;
        lapsed.boost_expires_at = Some(noon() - Duration::minutes(1));
        let mut renewed = lapsed.clone();
        renewed.boost_expires_at = Some(noon() + Duration::minutes(30));

        let mut repo = MockUserEntitlementRepository::new();
        let mut calls = 0;
        repo.expect_find_by_user_id().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(lapsed.clone()))
            } else {
                Ok(Some(renewed.clone()))
            }
        });
        repo.expect_clear_expired_boost()
            .with(eq(user_id), eq(noon()))
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_decrement_counter().times(0);

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let outcome = engine.consume_like(user_id).await.unwrap();

        assert!(outcome.consumed);
        assert!(outcome.entitlement.unlimited_likes);
        assert_eq!(outcome.entitlement.likes_remaining, 3);
        assert_eq!(outcome.entitlement.boost_seconds_remaining, 30 * 60);
    }

    #[tokio::test]
    async fn lazy_expiry_leaves_live_boost_in_store() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.boost_active = true;
        row.boost_expires_at = Some(noon() + Duration::minutes(10));
        let repo = InMemoryEntitlements::with_row(row);

        let cleared = repo.clear_expired_boost(user_id, noon()).await.unwrap();

        assert!(cleared.is_none());
        assert!(repo.row(user_id).boost_active);
    }

    #[tokio::test]
    async fn boost_does_not_cover_super_likes() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.super_likes_remaining = 0;
        row.boost_active = true;
        row.boost_expires_at = Some(noon() + Duration::minutes(20));
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let outcome = engine.consume_super_like(user_id).await.unwrap();

        assert!(!outcome.consumed);
        assert!(repo.row(user_id).boost_active);
    }

    #[tokio::test]
    async fn lost_race_reports_failure() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.rewind_remaining = 1;
        let mut drained = row.clone();
        drained.rewind_remaining = 0;

        let mut repo = MockUserEntitlementRepository::new();
        let mut calls = 0;
        repo.expect_find_by_user_id().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(row.clone()))
            } else {
                Ok(Some(drained.clone()))
            }
        });
        repo.expect_decrement_counter()
            .with(eq(user_id), eq(QuotaCounter::Rewinds), eq(noon()))
            .times(1)
            .returning(|_, _, _| Ok(None));

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let outcome = engine.consume_rewind(user_id).await.unwrap();

        assert!(!outcome.consumed);
        assert_eq!(outcome.entitlement.rewind_remaining, 0);
    }

    #[tokio::test]
    async fn reset_restores_each_tier_allotment() {
        for tier in SubscriptionTier::ALL {
            let user_id = Uuid::new_v4();
            let mut row = fresh_row(user_id, noon() - Duration::days(1));
            row.subscription_tier = tier.to_string();
            row.tier_expires_at = tier.is_paid().then(|| noon() + Duration::days(10));
            row.likes_remaining = 0;
            row.super_likes_remaining = 0;
            row.rewind_remaining = 0;
            let repo = InMemoryEntitlements::with_row(row);
            let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

            let snapshot = engine.load(user_id).await.unwrap();
            let allotment = tier.allotment();

            assert_eq!(snapshot.subscription_tier, tier);
            // A one-day gap also grants the streak bonus on top of the refill.
            assert_eq!(
                snapshot.likes_remaining,
                allotment.likes + STREAK_BONUS_LIKES,
                "{tier}"
            );
            assert_eq!(snapshot.super_likes_remaining, allotment.super_likes, "{tier}");
            assert_eq!(snapshot.rewind_remaining, allotment.rewinds, "{tier}");
        }
    }

    #[tokio::test]
    async fn reset_without_login_gap_equals_table_value() {
        let user_id = Uuid::new_v4();
        // Reset happened yesterday but the login was already recorded today.
        let mut row = fresh_row(user_id, noon());
        row.last_reset = noon() - Duration::days(1);
        row.subscription_tier = SubscriptionTier::Elite.to_string();
        row.likes_remaining = 3;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(snapshot.likes_remaining, 100);
        assert_eq!(snapshot.super_likes_remaining, 7);
        assert_eq!(snapshot.rewind_remaining, 3);
    }

    #[tokio::test]
    async fn daily_reset_runs_once_per_day() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.last_reset = noon() - Duration::days(2);
        row.likes_remaining = 0;
        let repo = InMemoryEntitlements::with_row(row);
        let clock = FixedClock::at(noon());
        let engine = usecase(Arc::clone(&repo), Arc::clone(&clock));

        engine.load(user_id).await.unwrap();
        engine.consume_like(user_id).await.unwrap();
        clock.advance(Duration::hours(6));
        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(*repo.resets.lock().unwrap(), 1);
        assert_eq!(snapshot.likes_remaining, 29);
    }

    #[tokio::test]
    async fn reset_is_skipped_when_another_session_won() {
        let user_id = Uuid::new_v4();
        let mut stale = fresh_row(user_id, noon());
        stale.last_reset = noon() - Duration::days(1);
        let mut current = stale.clone();
        current.last_reset = noon() - Duration::hours(1);
        current.likes_remaining = 12;

        let mut repo = MockUserEntitlementRepository::new();
        let mut calls = 0;
        repo.expect_find_by_user_id().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(stale.clone()))
            } else {
                Ok(Some(current.clone()))
            }
        });
        repo.expect_reset_daily_counters()
            .times(1)
            .returning(|_, _, _, _, _| Ok(None));

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(snapshot.likes_remaining, 12);
    }

    #[tokio::test]
    async fn expired_paid_tier_is_downgraded_at_reset() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.last_reset = noon() - Duration::days(1);
        row.subscription_tier = SubscriptionTier::Prestige.to_string();
        row.tier_expires_at = Some(noon() - Duration::hours(3));
        row.likes_remaining = UNLIMITED - 10;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(snapshot.subscription_tier, SubscriptionTier::Free);
        assert_eq!(snapshot.tier_expires_at, None);
        assert_eq!(snapshot.likes_remaining, 30);
    }

    #[tokio::test]
    async fn streak_bonus_once_per_day_gap() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon() - Duration::days(1));
        row.last_reset = noon();
        row.streak_days = 6;
        row.likes_remaining = 10;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let first = engine.load(user_id).await.unwrap();
        let second = engine.load(user_id).await.unwrap();

        let bonus = STREAK_BONUS_LIKES + WEEKLY_STREAK_BONUS_LIKES;
        assert_eq!(first.streak_days, 7);
        assert_eq!(first.login_bonus_likes, bonus);
        assert_eq!(first.likes_remaining, 10 + bonus);
        assert_eq!(second.login_bonus_likes, 0);
        assert_eq!(second.likes_remaining, 10 + bonus);
    }

    #[tokio::test]
    async fn broken_streak_resets_without_bonus() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon() - Duration::days(3));
        row.last_reset = noon();
        row.streak_days = 9;
        row.likes_remaining = 10;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));

        let snapshot = engine.load(user_id).await.unwrap();

        assert_eq!(snapshot.streak_days, 1);
        assert_eq!(snapshot.login_bonus_likes, 0);
        assert_eq!(snapshot.likes_remaining, 10);
        assert_eq!(repo.row(user_id).last_login, noon());
    }

    #[tokio::test]
    async fn boost_lasts_thirty_minutes() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 0;
        let repo = InMemoryEntitlements::with_row(row);
        let clock = FixedClock::at(noon());
        let engine = usecase(Arc::clone(&repo), Arc::clone(&clock));

        let snapshot = engine.activate_boost(user_id).await.unwrap();
        assert!(snapshot.can_like);
        assert_eq!(snapshot.boost_seconds_remaining, 30 * 60);

        clock.advance(Duration::minutes(29));
        assert!(engine.consume_like(user_id).await.unwrap().consumed);

        clock.advance(Duration::minutes(2));
        let outcome = engine.consume_like(user_id).await.unwrap();
        assert!(!outcome.consumed);
        assert!(!repo.row(user_id).boost_active);
    }

    #[tokio::test]
    async fn tier_change_overwrites_counters() {
        let user_id = Uuid::new_v4();
        let mut row = fresh_row(user_id, noon());
        row.likes_remaining = 2;
        let repo = InMemoryEntitlements::with_row(row);
        let engine = usecase(Arc::clone(&repo), FixedClock::at(noon()));
        let expires_at = noon() + Duration::days(30);

        let snapshot = engine
            .update_subscription_tier(user_id, SubscriptionTier::Elite, Some(expires_at))
            .await
            .unwrap();

        assert_eq!(snapshot.subscription_tier, SubscriptionTier::Elite);
        assert_eq!(snapshot.likes_remaining, 100);
        assert_eq!(snapshot.rewind_remaining, 3);
        assert_eq!(snapshot.tier_expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn downgrade_to_free_drops_expiry() {
        let user_id = Uuid::new_v4();
        let mut repo = MockUserEntitlementRepository::new();
        repo.expect_set_tier()
            .with(eq(user_id), eq(SubscriptionTier::Free), eq(None), eq(noon()))
            .times(1)
            .returning(move |user_id, tier, expires, now| {
                Ok(entity_from_insert(InsertUserEntitlementEntity::initial(
                    user_id, tier, expires, now,
                )))
            });

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let snapshot = engine
            .update_subscription_tier(user_id, SubscriptionTier::Free, Some(noon()))
            .await
            .unwrap();

        assert_eq!(snapshot.tier_expires_at, None);
    }

    #[tokio::test]
    async fn repository_failure_surfaces_as_internal() {
        let mut repo = MockUserEntitlementRepository::new();
        repo.expect_find_by_user_id()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let engine = usecase(Arc::new(repo), FixedClock::at(noon()));
        let err = engine.consume_like(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, EntitlementError::Internal(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
