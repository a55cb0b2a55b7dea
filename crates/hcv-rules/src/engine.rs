//! # Rule Evaluation Engine
//!
//! Evaluates a credential against an ordered list of rules and aggregates a
//! tri-state verdict.
//!
//! ## Per-rule outcome
//!
//! 1. The predicate is compiled. A compile error fails the rule.
//! 2. The expression is applied to the `{payload, external}` context. A
//!    runtime logic error fails the rule.
//! 3. The result is coerced (see [`RuleOutcome::from_result`]):
//!    `"unknown"` in any case aborts the whole set as indeterminate,
//!    a true-coercible value passes the rule, anything else fails it.
//!
//! ## Aggregation
//!
//! Without an indeterminate short-circuit the verdict is `pass` iff no rule
//! failed. An empty rule list passes. A credential without a payload fails
//! with both lists empty.
//!
//! ## Determinism
//!
//! The clock is sampled once per call, so every rule in one evaluation sees
//! the same `validationClock`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hcv_core::{Clock, SystemClock, Timestamp};
use hcv_credential::Credential;

use crate::context::EvaluationContext;
use crate::logic::Expr;
use crate::model::{Rule, RuleSet, ValueSet};

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Tri-state result of rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    /// Insufficient data. Never to be read as pass or fail.
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RuleOutcome
// ---------------------------------------------------------------------------

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed,
    Failed,
    Indeterminate,
}

impl RuleOutcome {
    /// Coerce a raw predicate result.
    ///
    /// | Result | Outcome |
    /// |---|---|
    /// | `"unknown"` (any case) | indeterminate |
    /// | `true` / `false` | passed / failed |
    /// | `"true"` / `"false"` (any case) | passed / failed |
    /// | `1` / `0` | passed / failed |
    /// | anything else | failed |
    pub fn from_result(result: &Value) -> Self {
        match result {
            Value::String(s) if s.eq_ignore_ascii_case("unknown") => Self::Indeterminate,
            Value::String(s) if s.eq_ignore_ascii_case("true") => Self::Passed,
            Value::Bool(true) => Self::Passed,
            Value::Number(n) if n.as_f64() == Some(1.0) => Self::Passed,
            _ => Self::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Verdict plus the rules that passed and failed, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<'r> {
    pub verdict: Verdict,
    pub passed: Vec<&'r Rule>,
    pub failed: Vec<&'r Rule>,
}

impl<'r> Evaluation<'r> {
    fn empty(verdict: Verdict) -> Self {
        Self {
            verdict,
            passed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Ids of the failed rules, for display.
    pub fn failed_ids(&self) -> Vec<&'r str> {
        self.failed.iter().map(|rule| rule.id.as_str()).collect()
    }

    /// Ids of the passed rules.
    pub fn passed_ids(&self) -> Vec<&'r str> {
        self.passed.iter().map(|rule| rule.id.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// RuleEngine
// ---------------------------------------------------------------------------

/// Evaluates rules against credentials.
///
/// Stateless apart from the clock; one engine can serve any number of
/// concurrent evaluations.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine<C: Clock = SystemClock> {
    clock: C,
}

impl RuleEngine<SystemClock> {
    /// Engine reading the system clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> RuleEngine<C> {
    /// Engine reading an injected clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Evaluate `rules` against `credential`'s payload.
    pub fn evaluate<'r>(
        &self,
        credential: &Credential,
        rules: &'r [Rule],
        value_sets: &[ValueSet],
    ) -> Evaluation<'r> {
        match credential.payload() {
            Some(payload) => self.evaluate_payload(payload, rules, value_sets),
            None => {
                tracing::info!(
                    family = %credential.family(),
                    verdict = %Verdict::Fail,
                    "credential has no payload"
                );
                Evaluation::empty(Verdict::Fail)
            }
        }
    }

    /// Evaluate every rule of a rule set. The set-level predicate is not
    /// consulted.
    pub fn evaluate_rule_set<'r>(
        &self,
        credential: &Credential,
        rule_set: &'r RuleSet,
        value_sets: &[ValueSet],
    ) -> Evaluation<'r> {
        tracing::debug!(rule_set = %rule_set.id, rules = rule_set.rules.len(), "evaluating rule set");
        self.evaluate(credential, &rule_set.rules, value_sets)
    }

    /// Evaluate `rules` against an already-extracted payload.
    pub fn evaluate_payload<'r>(
        &self,
        payload: Value,
        rules: &'r [Rule],
        value_sets: &[ValueSet],
    ) -> Evaluation<'r> {
        let now: Timestamp = self.clock.now();
        let context = EvaluationContext::new(payload, now)
            .with_value_sets(value_sets)
            .into_value();

        let mut evaluation = Evaluation::empty(Verdict::Pass);
        for rule in rules {
            match evaluate_rule(rule, &context) {
                RuleOutcome::Passed => evaluation.passed.push(rule),
                RuleOutcome::Failed => evaluation.failed.push(rule),
                RuleOutcome::Indeterminate => {
                    tracing::info!(rule_id = %rule.id, verdict = %Verdict::Unknown, "rule evaluation indeterminate");
                    return Evaluation::empty(Verdict::Unknown);
                }
            }
        }

        if !evaluation.failed.is_empty() {
            evaluation.verdict = Verdict::Fail;
        }
        tracing::info!(
            verdict = %evaluation.verdict,
            passed = evaluation.passed.len(),
            failed = evaluation.failed.len(),
            validation_clock = %now,
            "rule evaluation complete"
        );
        evaluation
    }
}

fn evaluate_rule(rule: &Rule, context: &Value) -> RuleOutcome {
    let expr = match Expr::compile(&rule.predicate) {
        Ok(expr) => expr,
        Err(e) => {
            tracing::warn!(rule_id = %rule.id, error = %e, "rule predicate does not compile");
            return RuleOutcome::Failed;
        }
    };
    let outcome = match expr.apply(context) {
        Ok(result) => RuleOutcome::from_result(&result),
        Err(e) => {
            tracing::warn!(rule_id = %rule.id, error = %e, "rule predicate failed at runtime");
            RuleOutcome::Failed
        }
    };
    tracing::debug!(rule_id = %rule.id, outcome = ?outcome, "rule evaluated");
    outcome
}
