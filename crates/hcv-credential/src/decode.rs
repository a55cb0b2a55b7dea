//! # Credential decoding
//!
//! Turns raw presented bytes into a [`Credential`]. Classification fails
//! closed: input that matches no family becomes [`Credential::Unknown`]
//! rather than an error, and every downstream check handles `Unknown`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use crate::credential::{CompactBinaryToken, CompactSignedToken, Credential};
use crate::cwt;

impl Credential {
    /// Classify a JSON document.
    ///
    /// - An object with `credentialSubject` is a structured credential
    ///   (if it also deserializes as one).
    /// - An object carrying any registered claim is a compact signed token
    ///   payload.
    /// - Anything else is `Unknown`.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Unknown;
        };
        if map.contains_key("credentialSubject") {
            return match serde_json::from_value(Value::Object(map)) {
                Ok(vc) => Self::Structured(vc),
                Err(e) => {
                    tracing::debug!(error = %e, "structured credential did not deserialize");
                    Self::Unknown
                }
            };
        }
        if CompactSignedToken::REGISTERED_CLAIMS
            .iter()
            .any(|claim| map.contains_key(*claim))
        {
            return Self::CompactSigned(CompactSignedToken::new(map));
        }
        Self::Unknown
    }

    /// Read the payload of a compact JWS (`header.payload.signature`).
    ///
    /// The signature segment is not checked here.
    pub fn from_compact_jws(token: &str) -> Self {
        let segments: Vec<&str> = token.trim().split('.').collect();
        if segments.len() != 3 {
            tracing::debug!(segments = segments.len(), "not a compact JWS");
            return Self::Unknown;
        }
        let encoded = segments[1].trim_end_matches('=');
        let decoded = match URL_SAFE_NO_PAD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "JWS payload is not base64url");
                return Self::Unknown;
            }
        };
        match serde_json::from_slice::<Value>(&decoded) {
            Ok(Value::Object(claims)) => Self::CompactSigned(CompactSignedToken::new(claims)),
            Ok(_) => Self::Unknown,
            Err(e) => {
                tracing::debug!(error = %e, "JWS payload is not JSON");
                Self::Unknown
            }
        }
    }

    /// Decode a CWT claims map (bare, tagged, or inside COSE_Sign1).
    pub fn from_cbor(bytes: &[u8]) -> Self {
        match cwt::decode_claims(bytes) {
            Ok(claims) => Self::CompactBinary(CompactBinaryToken::new(claims)),
            Err(e) => {
                tracing::debug!(error = %e, "CBOR claims did not decode");
                Self::Unknown
            }
        }
    }

    /// Sniff the encoding of presented bytes and decode accordingly.
    ///
    /// JSON text is tried first, then compact JWS text, then CBOR.
    pub fn decode(bytes: &[u8]) -> Self {
        let credential = match std::str::from_utf8(bytes).map(str::trim) {
            Ok(text) if text.starts_with('{') => match serde_json::from_str::<Value>(text) {
                Ok(value) => Self::from_json(value),
                Err(_) => Self::Unknown,
            },
            Ok(text) if text.split('.').count() == 3 && !text.contains(char::is_whitespace) => {
                Self::from_compact_jws(text)
            }
            _ => Self::from_cbor(bytes),
        };
        tracing::debug!(family = %credential.family(), "decoded credential");
        credential
    }
}
