//! # Expiry Evaluator
//!
//! Missing expiry fails open: a credential without a usable expiration claim
//! does not expire. This is the deliberate opposite of the fail-closed
//! signature and type checks.
//!
//! Comparison is at second granularity and inclusive on the expired side:
//! a credential whose expiration is the current second is already expired.

use hcv_core::{Clock, SystemClock, Timestamp};

use crate::credential::Credential;
use crate::error::CredentialError;

impl Credential {
    /// Whether the credential is expired right now (system clock).
    ///
    /// # Errors
    ///
    /// [`CredentialError::Unclassifiable`] for `Unknown` credentials. Missing
    /// or malformed expiration claims are never errors.
    pub fn is_expired(&self) -> Result<bool, CredentialError> {
        self.is_expired_with(&SystemClock)
    }

    /// Whether the credential is expired at the instant read from `clock`.
    pub fn is_expired_with(&self, clock: &impl Clock) -> Result<bool, CredentialError> {
        self.is_expired_at(clock.now())
    }

    /// Whether the credential is expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> Result<bool, CredentialError> {
        let expired = match self.expiration_date()? {
            Some(expiration) => now >= expiration,
            None => false,
        };
        tracing::trace!(family = %self.family(), expired, "expiry evaluated");
        Ok(expired)
    }
}
