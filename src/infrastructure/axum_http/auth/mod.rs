use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const SERVICE_ROLE: &str = "service_role";

#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    pub role: String,
    pub email: Option<String>,
    pub exp: usize,
}

/// Shared secret used to check bearer tokens, installed as a request extension.
#[derive(Clone)]
pub struct SupabaseJwtSecret(pub Arc<str>);

impl SupabaseJwtSecret {
    pub fn new(secret: &str) -> Self {
        Self(Arc::from(secret))
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl AuthUser {
    pub fn is_service_role(&self) -> bool {
        self.role == SERVICE_ROLE
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

pub fn validate_supabase_jwt(token: &str, secret: &str) -> Result<SupabaseClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_audience(&["authenticated", SERVICE_ROLE]);

    let token_data = decode::<SupabaseClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

type AuthRejection = (StatusCode, String);

fn unauthorized(message: &str) -> AuthRejection {
    (StatusCode::UNAUTHORIZED, message.to_string())
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthRejection> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(secret) = parts.extensions.get::<SupabaseJwtSecret>().cloned() else {
            warn!("auth: jwt secret extension missing from router");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ));
        };

        let claims = validate_supabase_jwt(bearer_token(parts)?, &secret.0).map_err(|err| {
            warn!(error = %err.0, "auth: bearer token rejected");
            unauthorized("Invalid or expired token")
        })?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| unauthorized("Invalid user ID in token"))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
