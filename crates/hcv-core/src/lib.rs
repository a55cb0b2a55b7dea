//! # hcv-core: Foundational Types for the Credential Verifier
//!
//! The leaf of the workspace dependency graph. Every other `hcv-*` crate
//! depends on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **UTC-only timestamps.** [`Timestamp`] is always UTC and truncated to
//!    seconds, so expiry comparisons and the validation clock exposed to
//!    rule predicates never see sub-second noise.
//!
//! 2. **One date grammar.** Credential expiration strings and date operands
//!    inside rule predicates are both read through
//!    [`Timestamp::parse_credential_date`].
//!
//! 3. **Injected time.** Anything that needs "now" takes a [`Clock`], so a
//!    whole evaluation sees one instant and tests never read the wall clock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hcv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod error;
pub mod temporal;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::HcvError;
pub use temporal::{TimeUnit, Timestamp};
