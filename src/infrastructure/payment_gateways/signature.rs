use anyhow::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::repositories::payment_gateways::NotificationVerifier;

type HmacSha256 = Hmac<Sha256>;

/// Shared-secret check for gateway notifications. Without a secret every
/// notification is accepted.
pub struct HmacNotificationVerifier {
    secret: Option<String>,
}

impl HmacNotificationVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|secret| !secret.is_empty()),
        }
    }
}

impl NotificationVerifier for HmacNotificationVerifier {
    fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<()> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };
        let signature = signature.ok_or_else(|| anyhow::anyhow!("missing webhook signature"))?;
        verify_hex_signature(secret, payload, signature)
    }
}

/// Checks a hex encoded HMAC-SHA256 of `payload` in constant time.
pub fn verify_hex_signature(secret: &str, payload: &[u8], signature: &str) -> Result<()> {
    let provided = hex::decode(signature.trim())?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    mac.verify_slice(&provided)
        .map_err(|_| anyhow::anyhow!("invalid webhook signature"))
}

#[cfg(test)]
pub fn sign_hex(secret: &str, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
