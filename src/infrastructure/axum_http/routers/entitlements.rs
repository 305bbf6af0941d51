use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::usercases::entitlements::{EntitlementError, EntitlementUseCase},
    domain::{
        repositories::user_entitlements::UserEntitlementRepository,
        value_objects::{
            entitlements::UpdateTierRequest,
            enums::{quota_counters::QuotaCounter, subscription_tiers::SubscriptionTier},
        },
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::repositories::user_entitlements::UserEntitlementPostgres,
    },
};

pub fn routes(entitlement_usecase: Arc<EntitlementUseCase<UserEntitlementPostgres>>) -> Router {
    Router::new()
        .route("/", get(load::<UserEntitlementPostgres>))
        .route("/likes/consume", post(consume_like::<UserEntitlementPostgres>))
        .route(
            "/super-likes/consume",
            post(consume_super_like::<UserEntitlementPostgres>),
        )
        .route("/rewinds/consume", post(consume_rewind::<UserEntitlementPostgres>))
        .route("/boost", post(activate_boost::<UserEntitlementPostgres>))
        .route(
            "/:user_id/tier",
            put(update_subscription_tier::<UserEntitlementPostgres>),
        )
        .with_state(entitlement_usecase)
}

pub async fn load<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    match entitlement_usecase.load(auth.user_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn consume_like<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    consume(entitlement_usecase, auth, QuotaCounter::Likes).await
}

pub async fn consume_super_like<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    consume(entitlement_usecase, auth, QuotaCounter::SuperLikes).await
}

pub async fn consume_rewind<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    consume(entitlement_usecase, auth, QuotaCounter::Rewinds).await
}

/// A refused consumption is still a 200: `consumed: false` is an answer, not a failure.
async fn consume<T>(
    entitlement_usecase: Arc<EntitlementUseCase<T>>,
    auth: AuthUser,
    counter: QuotaCounter,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    match entitlement_usecase.consume(auth.user_id, counter).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn activate_boost<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    match entitlement_usecase.activate_boost(auth.user_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_subscription_tier<T>(
    State(entitlement_usecase): State<Arc<EntitlementUseCase<T>>>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(update_tier_request): Json<UpdateTierRequest>,
) -> Response
where
    T: UserEntitlementRepository + Send + Sync,
{
    if !auth.is_service_role() {
        warn!(caller = %auth.user_id, %user_id, "entitlements router: tier change refused for non service role");
        return EntitlementError::Forbidden.into_response();
    }

    let Some(tier) = SubscriptionTier::from_str(&update_tier_request.tier) else {
        return EntitlementError::InvalidTier(update_tier_request.tier).into_response();
    };

    info!(%user_id, %tier, "entitlements router: service tier change");
    match entitlement_usecase
        .update_subscription_tier(user_id, tier, update_tier_request.expires_at)
        .await
    {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => err.into_response(),
    }
}
