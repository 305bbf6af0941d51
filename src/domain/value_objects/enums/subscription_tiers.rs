use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Counter value standing in for "unlimited". Counters stay plain integers so the
/// decrement path is the same for every tier.
pub const UNLIMITED: i32 = 999_999;

/// Daily counter values granted by a tier at every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allotment {
    pub likes: i32,
    pub super_likes: i32,
    pub rewinds: i32,
}

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Essentiel,
    Elite,
    Prestige,
    #[serde(alias = "prestige-femme")]
    PrestigeFemme,
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 5] = [
        SubscriptionTier::Free,
        SubscriptionTier::Essentiel,
        SubscriptionTier::Elite,
        SubscriptionTier::Prestige,
        SubscriptionTier::PrestigeFemme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Essentiel => "essentiel",
            SubscriptionTier::Elite => "elite",
            SubscriptionTier::Prestige => "prestige",
            SubscriptionTier::PrestigeFemme => "prestige_femme",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(SubscriptionTier::Free),
            "essentiel" => Some(SubscriptionTier::Essentiel),
            "elite" => Some(SubscriptionTier::Elite),
            "prestige" => Some(SubscriptionTier::Prestige),
            "prestige_femme" | "prestige-femme" => Some(SubscriptionTier::PrestigeFemme),
            _ => None,
        }
    }

    pub fn allotment(&self) -> Allotment {
        match self {
            SubscriptionTier::Free => Allotment {
                likes: 30,
                super_likes: 1,
                rewinds: 0,
            },
            SubscriptionTier::Essentiel => Allotment {
                likes: 80,
                super_likes: 5,
                rewinds: 0,
            },
            SubscriptionTier::Elite => Allotment {
                likes: 100,
                super_likes: 7,
                rewinds: 3,
            },
            SubscriptionTier::Prestige => Allotment {
                likes: UNLIMITED,
                super_likes: 20,
                rewinds: UNLIMITED,
            },
            SubscriptionTier::PrestigeFemme => Allotment {
                likes: UNLIMITED,
                super_likes: 30,
                rewinds: 0,
            },
        }
    }

    /// Monthly price in XOF. The free tier cannot be purchased.
    pub fn price_xof(&self) -> Option<i32> {
        match self {
            SubscriptionTier::Free => None,
            SubscriptionTier::Essentiel => Some(2900),
            SubscriptionTier::Elite => Some(4900),
            SubscriptionTier::Prestige => Some(7900),
            SubscriptionTier::PrestigeFemme => Some(2000),
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    pub fn has_unlimited_likes(&self) -> bool {
        self.allotment().likes >= UNLIMITED
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
