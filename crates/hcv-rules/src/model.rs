//! # Policy data model
//!
//! Declarative reference data handed to the engine by the caller: rules,
//! rule sets, value sets and the issuer trust list. All of it is loaded
//! once per verification session and never mutated by the engine.
//!
//! Wire names follow the policy distribution format (`specID`, `type`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A single named predicate over a credential payload and external data.
///
/// `predicate` stays opaque text until the engine compiles it. Identity is
/// `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    /// Serialized JSON-logic expression.
    pub predicate: String,
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "specID", default)]
    pub spec_id: String,
}

impl Rule {
    /// Build a rule with only an id and a predicate. Other fields are empty.
    pub fn new(id: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: String::new(),
            name: String::new(),
            predicate: predicate.into(),
            rule_type: String::new(),
            category: String::new(),
            spec_id: String::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label used in logs and reports: the name if set, else the id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// An ordered, versioned collection of rules forming one policy.
///
/// The optional set-level `predicate` is carried for callers that combine
/// rule outcomes themselves. The engine does not evaluate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub set_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

// ---------------------------------------------------------------------------
// ValueSet
// ---------------------------------------------------------------------------

/// One entry of a [`ValueSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetItem {
    pub value: String,
    #[serde(default)]
    pub description: String,
}

/// A named reference list injected into the evaluation context under its
/// `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<ValueSetItem>,
}

impl ValueSet {
    /// Build a value set from bare item values.
    pub fn from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: String::new(),
            version: String::new(),
            name: name.into(),
            description: String::new(),
            items: values
                .into_iter()
                .map(|v| ValueSetItem {
                    value: v.into(),
                    description: String::new(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrustList
// ---------------------------------------------------------------------------

/// An authoritative issuer: its identifier, signing key ids and the
/// credential types it may issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerInfo {
    pub issuer: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub schemas: Vec<String>,
}

/// Issuers whose credentials are considered verifiable at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustList {
    #[serde(default)]
    pub issuers: Vec<IssuerInfo>,
}

impl TrustList {
    /// Look up an issuer by identifier.
    pub fn find(&self, issuer: &str) -> Option<&IssuerInfo> {
        self.issuers.iter().find(|info| info.issuer == issuer)
    }

    pub fn is_trusted(&self, issuer: &str) -> bool {
        self.find(issuer).is_some()
    }
}
