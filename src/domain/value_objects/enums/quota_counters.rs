use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The three daily counters held by an entitlement record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuotaCounter {
    Likes,
    SuperLikes,
    Rewinds,
}

impl QuotaCounter {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaCounter::Likes => "likes",
            QuotaCounter::SuperLikes => "super_likes",
            QuotaCounter::Rewinds => "rewinds",
        }
    }
}

impl Display for QuotaCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
