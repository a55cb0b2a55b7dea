//! Credential error types.

use thiserror::Error;

/// Errors raised by operations that need to inspect credential claims.
///
/// Missing claims are never errors; they resolve to per-operation defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The decoded input matched none of the supported families.
    ///
    /// Callers must report this as "cannot verify", which is distinct from
    /// "fails verification".
    #[error("credential could not be classified into any supported family")]
    Unclassifiable,
}
