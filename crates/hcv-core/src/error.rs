//! # Error Types
//!
//! Errors raised by the foundational types. Crate-specific errors
//! (`CredentialError`, `LogicError`, `PolicyError`) live next to the code
//! that raises them.

use thiserror::Error;

/// Errors from timestamp parsing and date arithmetic.
#[derive(Error, Debug)]
pub enum HcvError {
    /// A timestamp string did not match the accepted grammar.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A numeric epoch value is outside the representable range.
    #[error("epoch seconds out of range: {0}")]
    EpochOutOfRange(i64),

    /// Date arithmetic overflowed.
    #[error("date arithmetic overflow: {0}")]
    DateOverflow(String),
}
