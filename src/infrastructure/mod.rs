pub mod axum_http;
pub mod payment_gateways;
pub mod postgres;
