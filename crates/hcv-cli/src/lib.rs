//! # hcv-cli: Health Credential Verifier CLI
//!
//! Provides the `hcv` command-line interface, an external caller of the
//! verification core that wires every check into one pipeline.
//!
//! ## Subcommands
//!
//! - `hcv verify`: decode, gate, check and evaluate a presented credential.
//! - `hcv inspect`: print the normalized credential view.
//!
//! ```bash
//! hcv verify --credential pass.json --rules entry.yaml --value-sets codes.json
//! hcv verify --credential token.jws --trust-list trust.json --require-trusted-issuer --format json
//! hcv inspect --credential cert.cbor
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | pass |
//! | 1 | fail |
//! | 2 | indeterminate (rules reported insufficient data) |
//! | 3 | cannot verify (credential matches no supported encoding) |
//! | 4 | operational error (unreadable file, bad config or policy document) |

pub mod config;
pub mod inspect;
pub mod verify;

/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 4;
