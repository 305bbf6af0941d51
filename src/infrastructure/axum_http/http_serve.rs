use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    application::usercases::{
        entitlements::EntitlementUseCase,
        payments::{DynPaymentGateway, PaymentUseCase},
        swipes::SwipeUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::clock::SystemClock,
    infrastructure::{
        axum_http::{
            auth::SupabaseJwtSecret,
            default_routers,
            routers::{self, payments::SIGNATURE_HEADER},
        },
        payment_gateways::{
            orange_money::OrangeMoneyClient, signature::HmacNotificationVerifier, wave::WaveClient,
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                payments::PaymentPostgres, swipes::SwipePostgres,
                user_entitlements::UserEntitlementPostgres,
            },
        },
    },
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let entitlement_usecase = Arc::new(EntitlementUseCase::new(
        Arc::new(UserEntitlementPostgres::new(Arc::clone(&db_pool))),
        Arc::new(SystemClock),
        config.quota.utc_offset,
    ));

    let swipe_usecase = Arc::new(SwipeUseCase::new(
        Arc::new(SwipePostgres::new(Arc::clone(&db_pool))),
        Arc::clone(&entitlement_usecase),
    ));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout))
        .build()?;
    let gateways: Vec<DynPaymentGateway> = vec![
        Arc::new(OrangeMoneyClient::new(
            http.clone(),
            &config.payments.orange_money,
            &config.payments.app_url,
        )),
        Arc::new(WaveClient::new(
            http,
            &config.payments.wave,
            &config.payments.app_url,
        )),
    ];
    let payment_usecase = Arc::new(PaymentUseCase::new(
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        Arc::clone(&entitlement_usecase),
        gateways,
        Arc::new(HmacNotificationVerifier::new(
            config.payments.webhook_secret.clone(),
        )),
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/entitlements",
            routers::entitlements::routes(Arc::clone(&entitlement_usecase)),
        )
        .nest("/api/v1/swipes", routers::swipes::routes(swipe_usecase))
        .nest("/api/payment", routers::payments::routes(payment_usecase))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(SupabaseJwtSecret::new(&config.supabase.jwt_secret)))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static(SIGNATURE_HEADER),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        stage = %config.stage,
        orange_sandbox = config.payments.orange_money.sandbox,
        "Server is running on port {}",
        config.server.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
