//! Revocation status as reported by the external revocation collaborator.
//!
//! Revocation is a caller-side gate. It is never folded into the rule
//! evaluation context.

use serde::{Deserialize, Serialize};

use crate::result::VerificationResult;

/// Revocation lookup result for one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationStatus {
    /// Whether a revocation entry exists for the credential.
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RevocationStatus {
    pub fn is_revoked(&self) -> bool {
        self.exists
    }

    /// Render the gate as a check result.
    pub fn to_verification_result(&self) -> VerificationResult {
        if !self.exists {
            return VerificationResult::pass("credential is not revoked");
        }
        match &self.reason {
            Some(reason) => VerificationResult::fail(format!("credential revoked: {reason}")),
            None => VerificationResult::fail("credential revoked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_fields() {
        let status: RevocationStatus = serde_json::from_value(json!({
            "exists": true,
            "id": "rev-1",
            "reason": "key compromise",
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(status.is_revoked());
        assert_eq!(status.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        let check = status.to_verification_result();
        assert!(!check.is_pass());
        assert!(check.message.contains("key compromise"));
    }

    #[test]
    fn absent_entry_passes() {
        let status: RevocationStatus = serde_json::from_value(json!({"exists": false})).unwrap();
        assert!(!status.is_revoked());
        assert!(status.to_verification_result().is_pass());
    }
}
