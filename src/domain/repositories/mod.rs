pub mod payment_gateways;
pub mod payments;
pub mod swipes;
pub mod user_entitlements;
