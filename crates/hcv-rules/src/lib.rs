//! # hcv-rules: Rule Evaluation
//!
//! Decides whether a credential satisfies a verification policy.
//!
//! - **Model** (`model.rs`): `Rule`, `RuleSet`, `ValueSet`, `TrustList`.
//!   Declarative, data-only, immutable for the duration of an evaluation.
//!
//! - **Logic** (`logic/`): a JSON-logic interpreter. Predicates are compiled
//!   once into an expression tree and applied to a generic value context.
//!   Coercion rules are documented in `logic::value`.
//!
//! - **Context** (`context.rs`): `{payload, external}` where `external`
//!   carries the validation clock and the injected value sets.
//!
//! - **Engine** (`engine.rs`): evaluates each rule, partitions outcomes
//!   into passed and failed, aggregates a tri-state verdict.
//!
//! - **Loader** (`loader.rs`): reads policy documents from JSON or YAML.
//!
//! ## Failure posture
//!
//! A malformed predicate fails its rule and evaluation continues. A rule
//! that yields `"unknown"` aborts the whole set with an indeterminate
//! verdict. Neither is an engine-level error.

pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
pub mod logic;
pub mod model;

pub use context::EvaluationContext;
pub use engine::{Evaluation, RuleEngine, RuleOutcome, Verdict};
pub use error::{LogicError, PolicyError};
pub use loader::{load_revocation_status, load_rule_set, load_trust_list, load_value_sets};
pub use logic::Expr;
pub use model::{IssuerInfo, Rule, RuleSet, TrustList, ValueSet, ValueSetItem};
