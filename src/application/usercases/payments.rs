use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::usercases::entitlements::EntitlementUseCase,
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::{
            payment_gateways::{NotificationVerifier, PaymentGateway},
            payments::PaymentRepository,
            user_entitlements::UserEntitlementRepository,
        },
        value_objects::{
            daily_policy::paid_tier_expiry,
            enums::{
                payment_methods::PaymentMethod, payment_statuses::PaymentStatus,
                subscription_tiers::SubscriptionTier,
            },
            payments::{
                CheckoutRequest, InitiatePaymentRequest, InitiatePaymentResponse,
                PaymentHistoryItem, PaymentNotification, VerifyPaymentResponse,
            },
        },
    },
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} did not return a payment URL")]
    GatewayRejected(&'static str),
    #[error("could not reach {0}")]
    GatewayUnavailable(&'static str),
    #[error("payment not found")]
    NotFound,
    #[error("invalid signature")]
    InvalidSignature,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PaymentError::GatewayRejected(_) => StatusCode::BAD_REQUEST,
            PaymentError::GatewayUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PaymentError::NotFound => StatusCode::NOT_FOUND,
            PaymentError::InvalidSignature => StatusCode::FORBIDDEN,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type DynPaymentGateway = Arc<dyn PaymentGateway + Send + Sync>;
pub type DynNotificationVerifier = Arc<dyn NotificationVerifier + Send + Sync>;

pub struct PaymentUseCase<P, E>
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    payment_repository: Arc<P>,
    entitlements: Arc<EntitlementUseCase<E>>,
    gateways: HashMap<PaymentMethod, DynPaymentGateway>,
    verifier: DynNotificationVerifier,
}

impl<P, E> PaymentUseCase<P, E>
where
    P: PaymentRepository + Send + Sync,
    E: UserEntitlementRepository + Send + Sync,
{
    pub fn new(
        payment_repository: Arc<P>,
        entitlements: Arc<EntitlementUseCase<E>>,
        gateways: Vec<DynPaymentGateway>,
        verifier: DynNotificationVerifier,
    ) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|gateway| (gateway.method(), gateway))
            .collect();

        Self {
            payment_repository,
            entitlements,
            gateways,
            verifier,
        }
    }

    pub async fn initiate(
        &self,
        method: PaymentMethod,
        request: InitiatePaymentRequest,
    ) -> Result<InitiatePaymentResponse, PaymentError> {
        let (plan, amount) = validate_initiate(&request)?;
        let gateway = self.gateways.get(&method).ok_or_else(|| {
            error!(%method, "payments: no gateway configured");
            PaymentError::GatewayUnavailable(method.display_name())
        })?;

        let now = self.entitlements.now();
        let transaction_id = generate_transaction_id(method, now.timestamp());
        let user_id = request.user_id;

        let payment = self
            .payment_repository
            .create_pending(InsertPaymentEntity {
                user_id,
                transaction_id,
                plan: plan.to_string(),
                amount,
                method: method.to_string(),
                phone: Some(request.phone.trim().to_string()),
                email: request.email.trim().to_string(),
                status: PaymentStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, %method, db_error = ?err, "payments: failed to create pending payment");
                PaymentError::Internal(err)
            })?;

        info!(
            %user_id,
            %method,
            %plan,
            amount,
            payment_id = %payment.id,
            transaction_id = %payment.transaction_id,
            "payments: pending payment created"
        );

        let checkout = gateway
            .create_checkout(CheckoutRequest {
                payment_id: payment.id,
                transaction_id: payment.transaction_id.clone(),
                user_id,
                plan,
                amount,
            })
            .await;

        let payment_url = match checkout {
            Ok(Some(payment_url)) => payment_url,
            Ok(None) => {
                warn!(payment_id = %payment.id, %method, "payments: gateway answered without a payment url");
                self.mark_failed(&payment, now).await?;
                return Err(PaymentError::GatewayRejected(method.display_name()));
            }
            Err(err) => {
                error!(payment_id = %payment.id, %method, gateway_error = ?err, "payments: gateway unreachable");
                self.mark_failed(&payment, now).await?;
                return Err(PaymentError::GatewayUnavailable(method.display_name()));
            }
        };

        self.payment_repository
            .attach_payment_url(payment.id, &payment_url, self.entitlements.now())
            .await
            .map_err(|err| {
                error!(payment_id = %payment.id, db_error = ?err, "payments: failed to store payment url");
                PaymentError::Internal(err)
            })?;

        Ok(InitiatePaymentResponse {
            success: true,
            payment_url,
            transaction_id: payment.transaction_id,
        })
    }

    /// Applies a gateway notification. `raw_body` is what was signed.
    pub async fn notify(&self, raw_body: &[u8], signature: Option<&str>) -> Result<(), PaymentError> {
        self.verifier.verify(raw_body, signature).map_err(|err| {
            warn!(error = %err, "payments: notification signature rejected");
            PaymentError::InvalidSignature
        })?;

        let notification: PaymentNotification = serde_json::from_slice(raw_body).map_err(|err| {
            warn!(error = %err, "payments: malformed notification body");
            PaymentError::Validation("malformed notification body".to_string())
        })?;

        info!(
            reference = %notification.reference,
            status = %notification.status,
            external_transaction_id = ?notification.transaction_id,
            "payments: notification received"
        );

        let Ok(payment_id) = Uuid::parse_str(notification.reference.trim()) else {
            warn!(reference = %notification.reference, "payments: notification reference is not a payment id");
            return Err(PaymentError::NotFound);
        };

        let payment = self
            .payment_repository
            .find_by_id(payment_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or_else(|| {
                warn!(%payment_id, "payments: notification for unknown payment");
                PaymentError::NotFound
            })?;

        let status = PaymentStatus::from_provider_status(&notification.status);
        let now = self.entitlements.now();
        let completed_at = (status == PaymentStatus::Completed).then_some(now);

        let settled = self
            .payment_repository
            .settle(payment.id, status, notification.transaction_id, completed_at, now)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to settle payment");
                PaymentError::Internal(err)
            })?;

        let Some(settled) = settled else {
            // A retried success whose earlier activation failed still owes the tier.
            if status == PaymentStatus::Completed
                && PaymentStatus::from_str(&payment.status) == PaymentStatus::Completed
            {
                return self.ensure_tier_granted(&payment).await;
            }
            info!(%payment_id, current_status = %payment.status, "payments: already settled, ignoring");
            return Ok(());
        };

        info!(%payment_id, %status, "payments: payment settled");

        if status == PaymentStatus::Completed {
            self.activate_tier(&settled).await?;
        }

        Ok(())
    }

    pub async fn verify(&self, transaction_id: &str) -> Result<VerifyPaymentResponse, PaymentError> {
        let payment = self
            .payment_repository
            .find_by_transaction_id(transaction_id.trim())
            .await
            .map_err(PaymentError::Internal)?
            .ok_or(PaymentError::NotFound)?;

        Ok(VerifyPaymentResponse {
            success: true,
            status: PaymentStatus::from_str(&payment.status),
            plan: payment.plan,
            amount: payment.amount,
            completed_at: payment.completed_at,
        })
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<PaymentHistoryItem>, PaymentError> {
        let payments = self
            .payment_repository
            .list_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "payments: failed to list history");
                PaymentError::Internal(err)
            })?;

        Ok(payments.into_iter().map(PaymentHistoryItem::from).collect())
    }

    async fn activate_tier(&self, payment: &PaymentEntity) -> Result<(), PaymentError> {
        let Some(tier) = SubscriptionTier::from_str(&payment.plan) else {
            error!(payment_id = %payment.id, plan = %payment.plan, "payments: completed payment has unknown plan");
            return Err(PaymentError::Internal(anyhow::anyhow!(
                "unknown plan on payment {}",
                payment.id
            )));
        };

        let expires_at = paid_tier_expiry(payment.completed_at.unwrap_or_else(|| self.entitlements.now()));
        self.entitlements
            .update_subscription_tier(payment.user_id, tier, Some(expires_at))
            .await
            .map_err(|err| PaymentError::Internal(err.into()))?;

        info!(user_id = %payment.user_id, %tier, %expires_at, "payments: premium activated");
        Ok(())
    }

    /// Re-runs activation for an already completed payment unless the stored
    /// entitlement already carries its tier through the paid period.
    async fn ensure_tier_granted(&self, payment: &PaymentEntity) -> Result<(), PaymentError> {
        let record = self
            .entitlements
            .find_record(payment.user_id)
            .await
            .map_err(|err| PaymentError::Internal(err.into()))?;

        let paid_until = paid_tier_expiry(payment.completed_at.unwrap_or_else(|| self.entitlements.now()));
        let granted = record.is_some_and(|model| {
            SubscriptionTier::from_str(&payment.plan) == Some(model.subscription_tier)
                && model.tier_expires_at.is_some_and(|expires_at| expires_at >= paid_until)
        });

        if granted {
            info!(payment_id = %payment.id, "payments: already settled and tier granted, ignoring");
            return Ok(());
        }

        warn!(
            payment_id = %payment.id,
            user_id = %payment.user_id,
            plan = %payment.plan,
            "payments: completed payment without its tier, re-activating"
        );
        self.activate_tier(payment).await
    }

    async fn mark_failed(&self, payment: &PaymentEntity, now: DateTime<Utc>) -> Result<(), PaymentError> {
        self.payment_repository
            .settle(payment.id, PaymentStatus::Failed, None, None, now)
            .await
            .map_err(|err| {
                error!(payment_id = %payment.id, db_error = ?err, "payments: failed to mark payment failed");
                PaymentError::Internal(err)
            })?;
        Ok(())
    }
}

fn validate_initiate(request: &InitiatePaymentRequest) -> Result<(SubscriptionTier, i32), PaymentError> {
    let plan = SubscriptionTier::from_str(&request.plan)
        .ok_or_else(|| PaymentError::Validation(format!("unknown plan: {}", request.plan)))?;
    let amount = plan
        .price_xof()
        .ok_or_else(|| PaymentError::Validation(format!("plan {plan} cannot be purchased")))?;

    if request.phone.trim().is_empty() {
        return Err(PaymentError::Validation("phone is required".to_string()));
    }
    if !is_plausible_email(request.email.trim()) {
        return Err(PaymentError::Validation("email is invalid".to_string()));
    }

    Ok((plan, amount))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// `<PREFIX>-<unix seconds>-<4 random digits>`
pub fn generate_transaction_id(method: PaymentMethod, unix_seconds: i64) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
    format!("{}-{}-{}", method.transaction_prefix(), unix_seconds, suffix)
}
