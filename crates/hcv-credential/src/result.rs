//! Terminal outcome of a single verification check.

use serde::{Deserialize, Serialize};

/// Pass or fail for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

/// The result of a single check, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub result: CheckOutcome,
    pub message: String,
}

impl VerificationResult {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            result: CheckOutcome::Pass,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            result: CheckOutcome::Fail,
            message: message.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.result == CheckOutcome::Pass
    }
}
