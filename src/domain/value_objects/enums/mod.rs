pub mod payment_methods;
pub mod payment_statuses;
pub mod quota_counters;
pub mod subscription_tiers;
pub mod swipe_kinds;
