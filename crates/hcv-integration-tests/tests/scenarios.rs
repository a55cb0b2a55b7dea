//! # Verification Core: Scenario Tests
//!
//! End-to-end behavior of the credential model, expiry evaluator, type
//! classifier and rule engine working together:
//! - Expired compact token (scenario A)
//! - Status rule passing and failing (scenarios B and C)
//! - Rule referencing an absent value set (scenario D)
//! - Indeterminate short-circuit across families
//! - Shared validation clock

use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use hcv_core::{Clock, FixedClock, Timestamp};
use hcv_credential::{Credential, CredentialType};
use hcv_rules::{Rule, RuleEngine, ValueSet, Verdict};
use serde_json::{json, Value};
use tracing_subscriber::fmt::MakeWriter;

fn now() -> Timestamp {
    Timestamp::parse("2026-03-01T09:30:00Z").unwrap()
}

fn engine() -> RuleEngine<FixedClock> {
    RuleEngine::with_clock(FixedClock(now()))
}

fn status_rule() -> Rule {
    Rule::new("STATUS", r#"{"==": [{"var": "payload.status"}, "valid"]}"#).with_name("Status is valid")
}

/// Advances one second on every read.
struct TickingClock {
    start: i64,
    reads: AtomicI64,
}

impl TickingClock {
    fn new(start: Timestamp) -> Self {
        Self {
            start: start.epoch_secs(),
            reads: AtomicI64::new(0),
        }
    }

    fn reads(&self) -> i64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for TickingClock {
    fn now(&self) -> Timestamp {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        Timestamp::from_epoch_secs(self.start + n).unwrap()
    }
}

/// In-memory log sink for `tracing` output.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn token(claims: Value) -> Credential {
    let credential = Credential::from_json(claims);
    assert!(!credential.is_unknown());
    credential
}

// ---------------------------------------------------------------------------
// A. Expired credential
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_exp_ten_seconds_ago_is_expired() {
    let credential = token(json!({"iss": "issuer", "exp": now().epoch_secs() - 10}));
    assert!(credential.is_expired_at(now()).unwrap());
    assert!(credential.is_expired().unwrap());
}

#[test]
fn expiry_boundary_is_inclusive() {
    let same_second = token(json!({"iss": "issuer", "exp": now().epoch_secs()}));
    let next_second = token(json!({"iss": "issuer", "exp": now().epoch_secs() + 1}));
    assert!(same_second.is_expired_at(now()).unwrap());
    assert!(!next_second.is_expired_at(now()).unwrap());
}

#[test]
fn missing_expiry_never_expires() {
    let credential = token(json!({"iss": "issuer", "status": "valid"}));
    assert!(!credential.is_expired_at(now()).unwrap());
}

#[test]
fn unclassifiable_credential_is_an_error_not_a_verdict() {
    assert!(Credential::Unknown.is_expired_at(now()).is_err());
    assert!(!Credential::Unknown.is_known(None));
}

// ---------------------------------------------------------------------------
// B / C. Status rule
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_valid_status_passes() {
    let credential = token(json!({"iss": "issuer", "status": "valid"}));
    assert!(!credential.is_expired_at(now()).unwrap());
    let rules = [status_rule()];
    let eval = engine().evaluate(&credential, &rules, &[]);
    assert_eq!(eval.verdict, Verdict::Pass);
    assert!(eval.failed.is_empty());
    assert_eq!(eval.passed_ids(), ["STATUS"]);
}

#[test]
fn scenario_c_invalid_status_fails_with_that_rule() {
    let credential = token(json!({"iss": "issuer", "status": "invalid"}));
    let rules = [status_rule()];
    let eval = engine().evaluate(&credential, &rules, &[]);
    assert_eq!(eval.verdict, Verdict::Fail);
    assert_eq!(eval.failed, [&rules[0]]);
    assert!(eval.passed.is_empty());
}

// ---------------------------------------------------------------------------
// D. Absent value set
// ---------------------------------------------------------------------------

#[test]
fn scenario_d_absent_value_set_fails_rule() {
    let credential = token(json!({"iss": "issuer", "tt": "LP6464-4"}));
    let rules = [
        Rule::new("TT", r#"{"in": [{"var": "payload.tt"}, {"var": "external.covid-19-lab-test-type"}]}"#),
        status_rule(),
    ];
    let eval = engine().evaluate(&credential, &rules, &[]);
    assert_eq!(eval.verdict, Verdict::Fail);
    assert_eq!(eval.failed_ids(), ["TT", "STATUS"]);

    let sets = [ValueSet::from_values("covid-19-lab-test-type", ["LP6464-4", "LP217198-3"])];
    let eval = engine().evaluate(&credential, &rules[..1], &sets);
    assert_eq!(eval.verdict, Verdict::Pass);
}

#[test]
fn numeric_value_set_items_support_ranges() {
    let credential = token(json!({"iss": "issuer", "dn": 2}));
    let rules = [Rule::new(
        "DOSES",
        r#"{">=": [{"var": "payload.dn"}, {"var": "external.min-doses.0"}]}"#,
    )];
    let sets = [ValueSet::from_values("min-doses", ["2"])];
    assert_eq!(engine().evaluate(&credential, &rules, &sets).verdict, Verdict::Pass);

    let sets = [ValueSet::from_values("min-doses", ["2.5"])];
    assert_eq!(engine().evaluate(&credential, &rules, &sets).verdict, Verdict::Fail);
}

// ---------------------------------------------------------------------------
// Indeterminate short-circuit
// ---------------------------------------------------------------------------

#[test]
fn unknown_rule_discards_prior_outcomes() {
    let credential = token(json!({"iss": "issuer", "status": "invalid"}));
    let rules = [
        status_rule(),
        Rule::new("NEEDS-SC", r#"{"if": [{"missing": "payload.sc"}, "Unknown", true]}"#),
        Rule::new("AFTER-INDETERMINATE", "true"),
    ];

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let eval = tracing::subscriber::with_default(subscriber, || {
        engine().evaluate(&credential, &rules, &[])
    });

    assert_eq!(eval.verdict, Verdict::Unknown);
    assert!(eval.passed.is_empty());
    assert!(eval.failed.is_empty());

    let output = logs.contents();
    assert!(output.contains("STATUS"));
    assert!(output.contains("NEEDS-SC"));
    assert!(!output.contains("AFTER-INDETERMINATE"));
}

#[test]
fn empty_rule_list_passes_for_every_family() {
    let structured = Credential::from_json(json!({"issuer": "did:x", "credentialSubject": {}}));
    let signed = token(json!({"iss": "issuer"}));
    for credential in [structured, signed] {
        let eval = engine().evaluate(&credential, &[], &[]);
        assert_eq!(eval.verdict, Verdict::Pass);
    }
}

// ---------------------------------------------------------------------------
// Shared validation clock
// ---------------------------------------------------------------------------

#[test]
fn all_rules_see_one_clock_value() {
    let credential = token(json!({"iss": "issuer"}));
    let rule = Rule::new(
        "CLOCK",
        r#"{"==": [{"var": "external.validationClock"}, "2026-03-01T09:30:00Z"]}"#,
    );
    let rules = vec![rule; 50];
    let clock = TickingClock::new(now());
    let engine = RuleEngine::with_clock(&clock);

    let eval = engine.evaluate(&credential, &rules, &[]);
    assert_eq!(eval.passed.len(), 50);
    assert_eq!(clock.reads(), 1);

    // The next evaluation samples again and sees the later instant.
    let eval = engine.evaluate(&credential, &rules, &[]);
    assert_eq!(eval.failed.len(), 50);
    assert_eq!(clock.reads(), 2);
}

// ---------------------------------------------------------------------------
// Type classification
// ---------------------------------------------------------------------------

#[test]
fn type_classification_with_and_without_allow_list() {
    let credential = token(json!({"iss": "issuer", "type": "recovery"}));
    assert!(credential.is_known(None));
    let allowed = [CredentialType::new("vaccination"), CredentialType::new("recovery")];
    assert!(credential.is_known(Some(&allowed[..])));
    assert!(!credential.is_known(Some(&allowed[..1])));

    let sentinel = token(json!({"iss": "issuer", "type": "unknown"}));
    assert!(!sentinel.is_known(None));

    let untyped = token(json!({"iss": "issuer"}));
    assert!(!untyped.is_known(None));
}

proptest::proptest! {
    #[test]
    fn expiry_matches_clock_comparison(offset in -100_000i64..100_000) {
        let credential = token(json!({"iss": "issuer", "exp": now().epoch_secs() + offset}));
        proptest::prop_assert_eq!(credential.is_expired_at(now()).unwrap(), offset <= 0);
    }
}
