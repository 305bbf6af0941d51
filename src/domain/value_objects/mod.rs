pub mod daily_policy;
pub mod entitlements;
pub mod enums;
pub mod payments;
pub mod swipes;
