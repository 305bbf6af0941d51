use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "pending" => PaymentStatus::Pending,
            "completed" => PaymentStatus::Completed,
            _ => PaymentStatus::Failed,
        }
    }

    /// Maps the provider status string carried by the notification webhook.
    pub fn from_provider_status(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("SUCCESS") {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
