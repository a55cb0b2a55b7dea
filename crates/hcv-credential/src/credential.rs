//! # Credential Model
//!
//! [`Credential`] is a closed union over the supported encodings. Exactly
//! one form is populated per instance, and the family is fixed at
//! construction. Accessors normalize across families:
//!
//! | Accessor | Structured | Compact signed | Compact binary |
//! |---|---|---|---|
//! | `credential_type` | first non-`VerifiableCredential` entry of `type` | `type` claim | `type` claim, else derived from `hcert` |
//! | `expiration_date` | `expirationDate` string, credential date grammar | `exp` (epoch seconds) | claim `4` (epoch seconds) |
//! | `payload` | `credentialSubject` | full claim set | `hcert[1]`, else all claims |
//! | `issuer` | `issuer` string or `issuer.id` | `iss` | claim `1` |
//!
//! `Unknown` resolves `credential_type` to the `unknown` sentinel and has no
//! payload; operations that must inspect claims return
//! [`CredentialError::Unclassifiable`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hcv_core::Timestamp;

use crate::cwt::{ClaimKey, CLAIM_EXP, CLAIM_HCERT, CLAIM_IAT, CLAIM_ISS};
use crate::error::CredentialError;

/// The encoding family a credential was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialFamily {
    Structured,
    CompactSigned,
    CompactBinary,
    Unknown,
}

impl CredentialFamily {
    /// Stable string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::CompactSigned => "compact_signed",
            Self::CompactBinary => "compact_binary",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CredentialFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential type identifier, e.g. `"vaccination"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialType(String);

impl CredentialType {
    /// The sentinel for credentials whose family could not be determined.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The `unknown` sentinel.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Structured credential
// ---------------------------------------------------------------------------

/// A structured (W3C-style) credential.
///
/// Unknown fields are tolerated. `credentialSubject` stays an open tree so
/// that any subject schema can be evaluated by rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredCredential {
    /// JSON-LD context URIs.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Credential identifier (URN or DID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential type(s).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<CredentialTypeValue>,

    /// The issuer, either a bare identifier or an object with an `id`.
    pub issuer: IssuerValue,

    /// When the credential was issued, as written by the issuer.
    #[serde(rename = "issuanceDate", default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,

    /// Optional expiration, as written by the issuer.
    #[serde(rename = "expirationDate", default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// The credential subject.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Value,
}

/// Credential `type` value: either a single string or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialTypeValue {
    /// Single type string.
    Single(String),
    /// Array of type strings.
    Array(Vec<String>),
}

impl CredentialTypeValue {
    /// The most specific type: the first entry other than
    /// `"VerifiableCredential"`, or that entry when it is the only one.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s.as_str()),
            Self::Array(arr) => arr
                .iter()
                .find(|s| s.as_str() != "VerifiableCredential")
                .or_else(|| arr.first())
                .map(String::as_str),
        }
    }
}

/// Credential `issuer` value: a URI string or an object carrying `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssuerValue {
    Id(String),
    Object {
        id: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl IssuerValue {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Object { id, .. } => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Compact signed token
// ---------------------------------------------------------------------------

/// The payload of a compact signed token (JWS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactSignedToken {
    claims: Map<String, Value>,
}

impl CompactSignedToken {
    /// Registered claim names whose presence marks a claim set as a token.
    pub const REGISTERED_CLAIMS: [&'static str; 6] = ["iss", "sub", "iat", "exp", "nbf", "type"];

    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn credential_type(&self) -> Option<CredentialType> {
        match self.claims.get("type")? {
            Value::String(s) => Some(CredentialType::new(s.as_str())),
            Value::Array(items) => items
                .iter()
                .find_map(Value::as_str)
                .map(CredentialType::new),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Compact binary token
// ---------------------------------------------------------------------------

/// The claims map of a compact binary token (CWT).
///
/// Top-level keys keep their CBOR identity. Nested maps are converted into
/// the generic tree with integer keys rendered as decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactBinaryToken {
    claims: BTreeMap<ClaimKey, Value>,
}

impl CompactBinaryToken {
    pub fn new(claims: BTreeMap<ClaimKey, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &BTreeMap<ClaimKey, Value> {
        &self.claims
    }

    pub fn claim(&self, key: &ClaimKey) -> Option<&Value> {
        self.claims.get(key)
    }

    /// The health certificate carried under `hcert[1]`, if any.
    pub fn health_certificate(&self) -> Option<&Value> {
        self.claims
            .get(&ClaimKey::Int(CLAIM_HCERT))?
            .get("1")
            .filter(|v| v.is_object())
    }

    fn credential_type(&self) -> Option<CredentialType> {
        if let Some(Value::String(s)) = self.claims.get(&ClaimKey::Text("type".to_string())) {
            return Some(CredentialType::new(s.as_str()));
        }
        let cert = self.health_certificate()?;
        [("v", "vaccination"), ("t", "test"), ("r", "recovery")]
            .into_iter()
            .find(|(key, _)| cert.get(*key).is_some_and(|entries| !entries.is_null()))
            .map(|(_, name)| CredentialType::new(name))
    }

    fn payload(&self) -> Value {
        if let Some(cert) = self.health_certificate() {
            return cert.clone();
        }
        Value::Object(
            self.claims
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// A decoded credential in exactly one supported family.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Structured(StructuredCredential),
    CompactSigned(CompactSignedToken),
    CompactBinary(CompactBinaryToken),
    /// Input that matched none of the families.
    Unknown,
}

impl Credential {
    pub fn family(&self) -> CredentialFamily {
        match self {
            Self::Structured(_) => CredentialFamily::Structured,
            Self::CompactSigned(_) => CredentialFamily::CompactSigned,
            Self::CompactBinary(_) => CredentialFamily::CompactBinary,
            Self::Unknown => CredentialFamily::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The credential type, resolved through the active family only.
    ///
    /// `None` when the family carries no type information; the `unknown`
    /// sentinel when the family itself is unknown.
    pub fn credential_type(&self) -> Option<CredentialType> {
        match self {
            Self::Structured(vc) => vc
                .credential_type
                .as_ref()
                .and_then(CredentialTypeValue::primary)
                .map(CredentialType::new),
            Self::CompactSigned(token) => token.credential_type(),
            Self::CompactBinary(token) => token.credential_type(),
            Self::Unknown => Some(CredentialType::unknown()),
        }
    }

    /// The normalized expiration instant, or `None` when the active family
    /// carries no usable expiration claim.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Unclassifiable`] for `Unknown` credentials.
    pub fn expiration_date(&self) -> Result<Option<Timestamp>, CredentialError> {
        match self {
            Self::Structured(vc) => Ok(vc
                .expiration_date
                .as_deref()
                .and_then(Timestamp::parse_credential_date)),
            Self::CompactSigned(token) => Ok(token.claim("exp").and_then(numeric_date)),
            Self::CompactBinary(token) => {
                Ok(token.claim(&ClaimKey::Int(CLAIM_EXP)).and_then(numeric_date))
            }
            Self::Unknown => Err(CredentialError::Unclassifiable),
        }
    }

    /// When the credential was issued, if the active family says so.
    pub fn issued_at(&self) -> Result<Option<Timestamp>, CredentialError> {
        match self {
            Self::Structured(vc) => Ok(vc
                .issuance_date
                .as_deref()
                .and_then(Timestamp::parse_credential_date)),
            Self::CompactSigned(token) => Ok(token.claim("iat").and_then(numeric_date)),
            Self::CompactBinary(token) => {
                Ok(token.claim(&ClaimKey::Int(CLAIM_IAT)).and_then(numeric_date))
            }
            Self::Unknown => Err(CredentialError::Unclassifiable),
        }
    }

    /// The issuer identifier, used for trust-list lookups.
    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::Structured(vc) => Some(vc.issuer.id()),
            Self::CompactSigned(token) => token.claim("iss").and_then(Value::as_str),
            Self::CompactBinary(token) => {
                token.claim(&ClaimKey::Int(CLAIM_ISS)).and_then(Value::as_str)
            }
            Self::Unknown => None,
        }
    }

    /// The generic claims tree rules are evaluated against.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Structured(vc) => match &vc.credential_subject {
                Value::Null => None,
                subject => Some(subject.clone()),
            },
            Self::CompactSigned(token) => Some(Value::Object(token.claims().clone())),
            Self::CompactBinary(token) => Some(token.payload()),
            Self::Unknown => None,
        }
    }
}

/// Read a numeric date claim as POSIX seconds. Fractions are floored;
/// non-numeric or out-of-range values count as absent.
pub(crate) fn numeric_date(value: &Value) -> Option<Timestamp> {
    let secs = match value.as_i64() {
        Some(secs) => secs,
        None => {
            let f = value.as_f64()?.floor();
            if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return None;
            }
            f as i64
        }
    };
    Timestamp::from_epoch_secs(secs).ok()
}
