//! # Inspect Subcommand
//!
//! Prints the normalized view of a presented credential: family, type,
//! issuer, dates and the payload rules would see. No checks are run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use hcv_credential::Credential;

use crate::verify::read_credential;

/// Arguments for the `hcv inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Presented credential: JSON, compact JWS text, or CBOR bytes.
    #[arg(long, value_name = "FILE")]
    pub credential: PathBuf,
}

/// Normalized JSON view of a credential.
pub fn credential_view(credential: &Credential) -> Value {
    let date = |d: Option<hcv_core::Timestamp>| d.map(|t| t.to_iso8601());
    json!({
        "family": credential.family(),
        "type": credential.credential_type(),
        "issuer": credential.issuer(),
        "issuedAt": date(credential.issued_at().ok().flatten()),
        "expirationDate": date(credential.expiration_date().ok().flatten()),
        "payload": credential.payload(),
    })
}

/// Execute the inspect subcommand. Exit code 3 when the credential matches
/// no supported encoding.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let credential = read_credential(&args.credential)?;
    let view = credential_view(&credential);
    println!(
        "{}",
        serde_json::to_string_pretty(&view).context("failed to serialize credential view")?
    );
    Ok(if credential.is_unknown() { 3 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_view() {
        let credential = Credential::from_json(json!({
            "type": ["VerifiableCredential", "vaccination"],
            "issuer": "did:example:ministry",
            "issuanceDate": "2026-01-01T00:00:00Z",
            "expirationDate": "2027-01-01T00:00:00+0100",
            "credentialSubject": {"dn": 2}
        }));
        let view = credential_view(&credential);
        assert_eq!(view["family"], "structured");
        assert_eq!(view["type"], "vaccination");
        assert_eq!(view["issuer"], "did:example:ministry");
        assert_eq!(view["expirationDate"], "2026-12-31T23:00:00Z");
        assert_eq!(view["payload"], json!({"dn": 2}));
    }

    #[test]
    fn unknown_view() {
        let view = credential_view(&Credential::Unknown);
        assert_eq!(view["family"], "unknown");
        assert_eq!(view["type"], "unknown");
        assert_eq!(view["expirationDate"], Value::Null);
        assert_eq!(view["payload"], Value::Null);
    }

    #[test]
    fn run_inspect_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.bin");
        std::fs::write(&good, br#"{"iss": "x", "exp": 1800000000}"#).unwrap();
        std::fs::write(&bad, [0xffu8, 0x00]).unwrap();
        assert_eq!(run_inspect(&InspectArgs { credential: good }).unwrap(), 0);
        assert_eq!(run_inspect(&InspectArgs { credential: bad }).unwrap(), 3);
    }
}
