use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    enums::payment_methods::PaymentMethod, payments::CheckoutRequest,
};

#[automock]
#[async_trait]
pub trait PaymentGateway {
    fn method(&self) -> PaymentMethod;

    /// Opens a hosted checkout. `Ok(None)` when the provider answered without a
    /// payment URL; `Err` when it could not be reached.
    async fn create_checkout(&self, checkout_request: CheckoutRequest) -> Result<Option<String>>;
}

/// Decides whether a gateway notification is authentic.
pub trait NotificationVerifier {
    /// `Err` when the notification must be rejected.
    fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<()>;
}
