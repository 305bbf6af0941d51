use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    application::usercases::payments::PaymentUseCase,
    domain::{
        repositories::{payments::PaymentRepository, user_entitlements::UserEntitlementRepository},
        value_objects::{
            enums::payment_methods::PaymentMethod,
            payments::{InitiatePaymentRequest, VerifyPaymentRequest},
        },
    },
    infrastructure::postgres::repositories::{
        payments::PaymentPostgres, user_entitlements::UserEntitlementPostgres,
    },
};

pub const SIGNATURE_HEADER: &str = "x-signature";

type PostgresPaymentUseCase = PaymentUseCase<PaymentPostgres, UserEntitlementPostgres>;

pub fn routes(payment_usecase: Arc<PostgresPaymentUseCase>) -> Router {
    Router::new()
        .route(
            "/initiate/orange-money",
            post(initiate_orange_money::<PaymentPostgres, UserEntitlementPostgres>),
        )
        .route(
            "/initiate/wave",
            post(initiate_wave::<PaymentPostgres, UserEntitlementPostgres>),
        )
        .route("/notify", post(notify::<PaymentPostgres, UserEntitlementPostgres>))
        .route("/verify", post(verify::<PaymentPostgres, UserEntitlementPostgres>))
        .route(
            "/history/:user_id",
            get(history::<PaymentPostgres, UserEntitlementPostgres>),
        )
        .with_state(payment_usecase)
}

pub async fn initiate_orange_money<P, E>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, E>>>,
    Json(initiate_request): Json<InitiatePaymentRequest>,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    initiate(payment_usecase, PaymentMethod::OrangeMoney, initiate_request).await
}

pub async fn initiate_wave<P, E>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, E>>>,
    Json(initiate_request): Json<InitiatePaymentRequest>,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    initiate(payment_usecase, PaymentMethod::Wave, initiate_request).await
}

async fn initiate<P, E>(
    payment_usecase: Arc<PaymentUseCase<P, E>>,
    method: PaymentMethod,
    initiate_request: InitiatePaymentRequest,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    match payment_usecase.initiate(method, initiate_request).await {
        Ok(initiated) => (StatusCode::OK, Json(initiated)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Takes the raw body so the signature is checked over exactly what was sent.
pub async fn notify<P, E>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, E>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match payment_usecase.notify(&body, signature).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify<P, E>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, E>>>,
    Json(verify_request): Json<VerifyPaymentRequest>,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    match payment_usecase.verify(&verify_request.transaction_id).await {
        Ok(verified) => (StatusCode::OK, Json(verified)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn history<P, E>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, E>>>,
    Path(user_id): Path<Uuid>,
) -> Response
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    match payment_usecase.history(user_id).await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(err) => err.into_response(),
    }
}
