pub mod payments;
pub mod swipes;
pub mod user_entitlements;
