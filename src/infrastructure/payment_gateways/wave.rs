use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::read_checkout_answer;
use crate::{
    config::config_model::Wave,
    domain::{
        repositories::payment_gateways::PaymentGateway,
        value_objects::{enums::payment_methods::PaymentMethod, payments::CheckoutRequest},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSessionBody {
    /// Wave expects minor units.
    pub amount: i64,
    pub currency: &'static str,
    pub error_url: String,
    pub success_url: String,
    pub metadata: CheckoutMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutMetadata {
    pub payment_id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionAnswer {
    wave_launch_url: Option<String>,
}

pub struct WaveClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    app_url: String,
}

impl WaveClient {
    pub fn new(http: reqwest::Client, config: &Wave, app_url: &str) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            app_url: app_url.to_string(),
        }
    }

    pub fn checkout_session_body(&self, checkout_request: &CheckoutRequest) -> CheckoutSessionBody {
        let success_url = match url::Url::parse(&format!("{}/payment/success", self.app_url)) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("transaction", &checkout_request.transaction_id);
                url.to_string()
            }
            Err(_) => format!(
                "{}/payment/success?transaction={}",
                self.app_url, checkout_request.transaction_id
            ),
        };

        CheckoutSessionBody {
            amount: i64::from(checkout_request.amount) * 100,
            currency: "XOF",
            error_url: format!("{}/payment/error", self.app_url),
            success_url,
            metadata: CheckoutMetadata {
                payment_id: checkout_request.payment_id,
                user_id: checkout_request.user_id,
                plan: checkout_request.plan.to_string(),
            },
        }
    }
}

#[async_trait]
impl PaymentGateway for WaveClient {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Wave
    }

    async fn create_checkout(&self, checkout_request: CheckoutRequest) -> Result<Option<String>> {
        let body = self.checkout_session_body(&checkout_request);

        let resp = self
            .http
            .post(format!("{}/checkout/sessions", self.api_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let answer: Option<CheckoutSessionAnswer> =
            read_checkout_answer(resp, "wave", "create checkout session").await;
        let launch_url = answer.and_then(|answer| answer.wave_launch_url);

        info!(
            payment_id = %checkout_request.payment_id,
            has_url = launch_url.is_some(),
            "wave: checkout session requested"
        );
        Ok(launch_url)
    }
}
