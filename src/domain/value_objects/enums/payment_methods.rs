use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    OrangeMoney,
    Wave,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::OrangeMoney => "orange-money",
            PaymentMethod::Wave => "wave",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::OrangeMoney => "Orange Money",
            PaymentMethod::Wave => "Wave",
        }
    }

    /// Prefix of the locally generated transaction id.
    pub fn transaction_prefix(&self) -> &'static str {
        match self {
            PaymentMethod::OrangeMoney => "TRX",
            PaymentMethod::Wave => "WAVE",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
