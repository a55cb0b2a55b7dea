//! # hcv-credential: Credential Model
//!
//! A decoded credential arrives in one of three incompatible encodings:
//!
//! - **Structured** (`credential.rs`): a W3C-style claims graph with a typed
//!   subject and string-valued dates.
//! - **Compact signed** (`credential.rs`): a JWS payload with POSIX-seconds
//!   claims (`exp`, `iat`) and a `type` discriminator.
//! - **Compact binary** (`cwt.rs`): a CBOR/CWT claims map, same claim
//!   semantics with integer keys.
//!
//! [`Credential`] is a closed tagged union over these plus `Unknown`, the
//! fail-closed classification for input that matches no family. Accessors
//! pattern-match on the variant.
//!
//! Checks built on the model:
//!
//! - **Expiry** (`expiry.rs`): missing expiry means "does not expire".
//! - **Type classification** (`classify.rs`).
//! - **Revocation status** (`revocation.rs`): a caller-side gate.
//!
//! ## Security Invariant
//!
//! Signatures, issuer keys and trust lists are resolved upstream. Decoders
//! here read payloads only and never report a credential as verified.

pub mod classify;
pub mod credential;
pub mod cwt;
pub mod decode;
pub mod error;
pub mod expiry;
pub mod result;
pub mod revocation;

pub use credential::{
    CompactBinaryToken, CompactSignedToken, Credential, CredentialFamily, CredentialType,
    StructuredCredential,
};
pub use cwt::ClaimKey;
pub use error::CredentialError;
pub use result::{CheckOutcome, VerificationResult};
pub use revocation::RevocationStatus;
