use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::quota_counters::QuotaCounter;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwipeKind {
    Like,
    SuperLike,
    Pass,
}

impl SwipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeKind::Like => "like",
            SwipeKind::SuperLike => "super_like",
            SwipeKind::Pass => "pass",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "like" => Some(SwipeKind::Like),
            "super_like" => Some(SwipeKind::SuperLike),
            "pass" => Some(SwipeKind::Pass),
            _ => None,
        }
    }

    /// Counter spent by this swipe, if any.
    pub fn cost(&self) -> Option<QuotaCounter> {
        match self {
            SwipeKind::Like => Some(QuotaCounter::Likes),
            SwipeKind::SuperLike => Some(QuotaCounter::SuperLikes),
            SwipeKind::Pass => None,
        }
    }

    pub fn is_positive(&self) -> bool {
        !matches!(self, SwipeKind::Pass)
    }
}

impl Display for SwipeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
