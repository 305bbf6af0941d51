use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::application::usercases::{
    entitlements::EntitlementError, payments::PaymentError, swipes::SwipeError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Body shape the payment page expects on failure.
#[derive(Debug, Serialize)]
pub struct PaymentErrorResponse {
    pub success: bool,
    pub message: String,
}

fn json_error(status: StatusCode, message: String) -> Response {
    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}

impl IntoResponse for EntitlementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            EntitlementError::Internal(err) => {
                // Don't leak internal error detail to client
                error!(error = ?err, "entitlements: internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        json_error(status, message)
    }
}

impl IntoResponse for SwipeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            SwipeError::Internal(err) => {
                error!(error = ?err, "swipes: internal error");
                "Internal server error".to_string()
            }
            SwipeError::Entitlement(err) => return err.into_response(),
            other => other.to_string(),
        };

        json_error(status, message)
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            PaymentError::Internal(err) => {
                error!(error = ?err, "payments: internal error");
                "Internal server error".to_string()
            }
            PaymentError::GatewayRejected(provider) => {
                format!("Erreur lors de l'initialisation du paiement {provider}")
            }
            PaymentError::GatewayUnavailable(provider) => {
                format!("Erreur de connexion à {provider}")
            }
            PaymentError::NotFound => "Transaction non trouvée".to_string(),
            other => other.to_string(),
        };

        let body = Json(PaymentErrorResponse {
            success: false,
            message,
        });

        (status, body).into_response()
    }
}
