use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::read_checkout_answer;
use crate::{
    config::config_model::OrangeMoney,
    domain::{
        repositories::payment_gateways::PaymentGateway,
        value_objects::{enums::payment_methods::PaymentMethod, payments::CheckoutRequest},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebPaymentBody {
    pub merchant_key: String,
    pub currency: &'static str,
    pub order_id: String,
    pub amount: i32,
    pub return_url: String,
    pub cancel_url: String,
    pub notif_url: String,
    pub lang: &'static str,
    pub reference: Uuid,
}

#[derive(Debug, Deserialize)]
struct WebPaymentAnswer {
    payment_url: Option<String>,
}

/// Orange Money Web Payment client.
pub struct OrangeMoneyClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    merchant_key: String,
    app_url: String,
}

impl OrangeMoneyClient {
    pub fn new(http: reqwest::Client, config: &OrangeMoney, app_url: &str) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            merchant_key: config.merchant_key.clone(),
            app_url: app_url.to_string(),
        }
    }

    pub fn web_payment_body(&self, checkout_request: &CheckoutRequest) -> WebPaymentBody {
        WebPaymentBody {
            merchant_key: self.merchant_key.clone(),
            currency: "XOF",
            order_id: checkout_request.transaction_id.clone(),
            amount: checkout_request.amount,
            return_url: format!("{}/payment/success", self.app_url),
            cancel_url: format!("{}/payment/cancel", self.app_url),
            notif_url: format!("{}/api/payment/notify", self.app_url),
            lang: "fr",
            reference: checkout_request.payment_id,
        }
    }
}

#[async_trait]
impl PaymentGateway for OrangeMoneyClient {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::OrangeMoney
    }

    async fn create_checkout(&self, checkout_request: CheckoutRequest) -> Result<Option<String>> {
        let body = self.web_payment_body(&checkout_request);

        let resp = self
            .http
            .post(format!("{}/webpayment", self.api_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let answer: Option<WebPaymentAnswer> =
            read_checkout_answer(resp, "orange-money", "create web payment").await;
        let payment_url = answer.and_then(|answer| answer.payment_url);

        info!(
            payment_id = %checkout_request.payment_id,
            has_url = payment_url.is_some(),
            "orange money: web payment requested"
        );
        Ok(payment_url)
    }
}
