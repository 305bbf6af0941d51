use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    application::usercases::swipes::SwipeUseCase,
    domain::{
        repositories::{swipes::SwipeRepository, user_entitlements::UserEntitlementRepository},
        value_objects::swipes::SwipeRequest,
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::repositories::{swipes::SwipePostgres, user_entitlements::UserEntitlementPostgres},
    },
};

type PostgresSwipeUseCase = SwipeUseCase<SwipePostgres, UserEntitlementPostgres>;

pub fn routes(swipe_usecase: Arc<PostgresSwipeUseCase>) -> Router {
    Router::new()
        .route("/", post(swipe::<SwipePostgres, UserEntitlementPostgres>))
        .route("/rewind", post(rewind::<SwipePostgres, UserEntitlementPostgres>))
        .with_state(swipe_usecase)
}

pub async fn swipe<S, E>(
    State(swipe_usecase): State<Arc<SwipeUseCase<S, E>>>,
    auth: AuthUser,
    Json(swipe_request): Json<SwipeRequest>,
) -> Response
where
    S: SwipeRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    match swipe_usecase
        .swipe(auth.user_id, swipe_request.target_user_id, swipe_request.action)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn rewind<S, E>(
    State(swipe_usecase): State<Arc<SwipeUseCase<S, E>>>,
    auth: AuthUser,
) -> Response
where
    S: SwipeRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    match swipe_usecase.rewind(auth.user_id).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => err.into_response(),
    }
}
