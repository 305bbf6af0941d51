use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::swipes::SwipeEntity,
    value_objects::{entitlements::EntitlementSnapshot, enums::swipe_kinds::SwipeKind},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SwipeRequest {
    pub target_user_id: Uuid,
    pub action: SwipeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwipeOutcome {
    pub action: SwipeKind,
    pub matched: bool,
    pub match_id: Option<Uuid>,
    pub entitlement: EntitlementSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewindOutcome {
    pub target_user_id: Uuid,
    pub action: SwipeKind,
    pub entitlement: EntitlementSnapshot,
}

impl RewindOutcome {
    pub fn from_swipe(swipe: &SwipeEntity, entitlement: EntitlementSnapshot) -> Self {
        Self {
            target_user_id: swipe.to_user_id,
            action: SwipeKind::from_str(&swipe.kind).unwrap_or(SwipeKind::Pass),
            entitlement,
        }
    }
}
