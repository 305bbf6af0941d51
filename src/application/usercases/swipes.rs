use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::usercases::entitlements::{EntitlementError, EntitlementUseCase},
    domain::{
        entities::swipes::{InsertMatchEntity, InsertSwipeEntity},
        repositories::{swipes::SwipeRepository, user_entitlements::UserEntitlementRepository},
        value_objects::{
            enums::{quota_counters::QuotaCounter, swipe_kinds::SwipeKind},
            swipes::{RewindOutcome, SwipeOutcome},
        },
    },
};

#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("cannot swipe on yourself")]
    SelfSwipe,
    #[error("no {0} left today")]
    QuotaExhausted(QuotaCounter),
    #[error("nothing to rewind")]
    NothingToRewind,
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SwipeError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SwipeError::SelfSwipe => StatusCode::BAD_REQUEST,
            SwipeError::QuotaExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
            SwipeError::NothingToRewind => StatusCode::NOT_FOUND,
            SwipeError::Entitlement(err) => err.status_code(),
            SwipeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct SwipeUseCase<S, E>
where
    S: SwipeRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    swipe_repository: Arc<S>,
    entitlements: Arc<EntitlementUseCase<E>>,
}

impl<S, E> SwipeUseCase<S, E>
where
    S: SwipeRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    pub fn new(swipe_repository: Arc<S>, entitlements: Arc<EntitlementUseCase<E>>) -> Self {
        Self {
            swipe_repository,
            entitlements,
        }
    }

    /// Records a swipe once the entitlement engine has paid for it. A like that
    /// closes a mutual pair opens a match.
    pub async fn swipe(
        &self,
        user_id: Uuid,
        target_user_id: Uuid,
        action: SwipeKind,
    ) -> Result<SwipeOutcome, SwipeError> {
        if user_id == target_user_id {
            return Err(SwipeError::SelfSwipe);
        }

        let entitlement = match action.cost() {
            Some(counter) => {
                let outcome = self.entitlements.consume(user_id, counter).await?;
                if !outcome.consumed {
                    info!(%user_id, %target_user_id, %action, "swipes: rejected, quota exhausted");
                    return Err(SwipeError::QuotaExhausted(counter));
                }
                outcome.entitlement
            }
            None => self.entitlements.load(user_id).await?,
        };

        self.swipe_repository
            .upsert_swipe(InsertSwipeEntity {
                from_user_id: user_id,
                to_user_id: target_user_id,
                kind: action.to_string(),
                created_at: self.entitlements.now(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, %target_user_id, db_error = ?err, "swipes: failed to record swipe");
                SwipeError::Internal(err)
            })?;

        let match_id = if action.is_positive() {
            self.match_if_mutual(user_id, target_user_id).await?
        } else {
            None
        };

        info!(%user_id, %target_user_id, %action, matched = match_id.is_some(), "swipes: recorded");
        Ok(SwipeOutcome {
            action,
            matched: match_id.is_some(),
            match_id,
            entitlement,
        })
    }

    /// Undoes the most recent swipe for one rewind. Matches it produced stay.
    pub async fn rewind(&self, user_id: Uuid) -> Result<RewindOutcome, SwipeError> {
        let latest = self
            .swipe_repository
            .find_latest_swipe(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "swipes: failed to load latest swipe");
                SwipeError::Internal(err)
            })?
            .ok_or(SwipeError::NothingToRewind)?;

        let outcome = self.entitlements.consume_rewind(user_id).await?;
        if !outcome.consumed {
            info!(%user_id, "swipes: rewind rejected, quota exhausted");
            return Err(SwipeError::QuotaExhausted(QuotaCounter::Rewinds));
        }

        self.swipe_repository
            .delete_swipe(latest.from_user_id, latest.to_user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "swipes: failed to delete rewound swipe");
                SwipeError::Internal(err)
            })?;

        info!(%user_id, target_user_id = %latest.to_user_id, "swipes: rewound");
        Ok(RewindOutcome::from_swipe(&latest, outcome.entitlement))
    }

    async fn match_if_mutual(
        &self,
        user_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<Option<Uuid>, SwipeError> {
        let liked_back = self
            .swipe_repository
            .has_liked(target_user_id, user_id)
            .await
            .map_err(SwipeError::Internal)?;
        if !liked_back {
            return Ok(None);
        }

        if let Some(existing) = self
            .swipe_repository
            .find_match_between(user_id, target_user_id)
            .await
            .map_err(SwipeError::Internal)?
        {
            return Ok(Some(existing.id));
        }

        let created = self
            .swipe_repository
            .create_match_if_absent(InsertMatchEntity::accepted(user_id, target_user_id))
            .await
            .map_err(|err| {
                error!(%user_id, %target_user_id, db_error = ?err, "swipes: failed to create match");
                SwipeError::Internal(err)
            })?;

        match created {
            Some(match_id) => {
                info!(%user_id, %target_user_id, %match_id, "swipes: new match");
                Ok(Some(match_id))
            }
            None => Ok(self
                .swipe_repository
                .find_match_between(user_id, target_user_id)
                .await
                .map_err(SwipeError::Internal)?
                .map(|existing| existing.id)),
        }
    }
}
