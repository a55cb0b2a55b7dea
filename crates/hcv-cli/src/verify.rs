//! # Verify Subcommand
//!
//! Runs every check against one presented credential and reports an
//! outcome:
//!
//! 1. Decode. An unclassifiable credential cannot be verified.
//! 2. Trust gate, when trusted issuers are required. Without a trust list
//!    no issuer can be trusted and the gate fails.
//! 3. Revocation gate, when a revocation status is supplied.
//! 4. Expiry and type checks.
//! 5. Rule evaluation, when a rule set is supplied.
//!
//! A failed gate stops the pipeline. Expiry, type and rule results are all
//! collected; any failure makes the outcome `fail`, and an indeterminate
//! rule evaluation makes it `unknown` only when nothing else failed. Each
//! check line carries its own pass / fail / unknown status.
//!
//! The clock is read once; expiry and the rule engine see the same instant.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use hcv_core::{Clock, FixedClock, SystemClock, Timestamp};
use hcv_credential::{
    Credential, CredentialFamily, CredentialType, RevocationStatus, VerificationResult,
};
use hcv_rules::{RuleEngine, RuleSet, TrustList, ValueSet, Verdict};

use crate::config::CliConfig;

/// Arguments for the `hcv verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Presented credential: JSON, compact JWS text, or CBOR bytes.
    #[arg(long, value_name = "FILE")]
    pub credential: PathBuf,

    /// Rule set document (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Value set document(s). Repeatable.
    #[arg(long = "value-sets", value_name = "FILE")]
    pub value_sets: Vec<PathBuf>,

    /// Issuer trust list document.
    #[arg(long, value_name = "FILE")]
    pub trust_list: Option<PathBuf>,

    /// Revocation status document for this credential.
    #[arg(long, value_name = "FILE")]
    pub revocation: Option<PathBuf>,

    /// Supported credential type. Repeatable; overrides configuration.
    #[arg(long = "supported-type", value_name = "TYPE")]
    pub supported_types: Vec<String>,

    /// Reject credentials from issuers missing on the trust list.
    #[arg(long)]
    pub require_trusted_issuer: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Outcome and report
// ---------------------------------------------------------------------------

/// Overall outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    /// Rule evaluation was indeterminate and nothing else failed.
    Unknown,
    /// The credential matched no supported encoding.
    CannotVerify,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Unknown => 2,
            Self::CannotVerify => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Unknown => "unknown",
            Self::CannotVerify => "cannot_verify",
        }
    }
}

/// Status of one report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Not enough data to decide.
    Unknown,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckLine {
    pub check: &'static str,
    #[serde(rename = "result")]
    pub status: CheckStatus,
    pub message: String,
}

impl CheckLine {
    fn from_result(check: &'static str, result: VerificationResult) -> Self {
        let status = if result.is_pass() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self {
            check,
            status,
            message: result.message,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// A failed rule, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRule {
    pub id: String,
    pub name: String,
}

/// Full verification report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub outcome: Outcome,
    pub family: CredentialFamily,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<CredentialType>,
    #[serde(rename = "validationClock")]
    pub validation_clock: Timestamp,
    pub checks: Vec<CheckLine>,
    pub failed_rules: Vec<FailedRule>,
}

impl Report {
    fn new(credential: &Credential, now: Timestamp) -> Self {
        Self {
            outcome: Outcome::Pass,
            family: credential.family(),
            credential_type: credential.credential_type(),
            validation_clock: now,
            checks: Vec::new(),
            failed_rules: Vec::new(),
        }
    }

    fn record(&mut self, check: &'static str, result: VerificationResult) {
        self.push(CheckLine::from_result(check, result));
    }

    fn push(&mut self, line: CheckLine) {
        match line.status {
            CheckStatus::Pass => {}
            CheckStatus::Fail => self.outcome = Outcome::Fail,
            CheckStatus::Unknown if self.outcome == Outcome::Pass => {
                self.outcome = Outcome::Unknown
            }
            CheckStatus::Unknown => {}
        }
        self.checks.push(line);
    }

    /// Render as human-readable text.
    pub fn to_text(&self) -> String {
        let mut out = format!("Outcome: {}\n", self.outcome.as_str().to_uppercase());
        out.push_str(&format!("Family: {}\n", self.family));
        if let Some(t) = &self.credential_type {
            out.push_str(&format!("Type: {t}\n"));
        }
        for line in &self.checks {
            out.push_str(&format!(
                "  {} {}: {}\n",
                line.status.as_str(),
                line.check,
                line.message
            ));
        }
        for rule in &self.failed_rules {
            out.push_str(&format!("  failed rule {} ({})\n", rule.id, rule.name));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Resolved policy inputs for one verification.
#[derive(Debug, Clone, Default)]
pub struct PolicyInputs {
    pub rule_set: Option<RuleSet>,
    pub value_sets: Vec<ValueSet>,
    pub trust_list: Option<TrustList>,
    pub revocation: Option<RevocationStatus>,
    pub supported_types: Option<Vec<CredentialType>>,
    pub require_trusted_issuer: bool,
}

/// Run the verification pipeline.
pub fn verify_credential(
    credential: &Credential,
    inputs: &PolicyInputs,
    clock: &impl Clock,
) -> Report {
    let now = clock.now();
    let mut report = Report::new(credential, now);

    if credential.is_unknown() {
        report.checks.push(CheckLine::from_result(
            "decode",
            VerificationResult::fail("credential matches no supported encoding"),
        ));
        report.outcome = Outcome::CannotVerify;
        return report;
    }

    if inputs.require_trusted_issuer {
        let result = match (credential.issuer(), &inputs.trust_list) {
            (_, None) => {
                VerificationResult::fail("trusted issuers required but no trust list supplied")
            }
            (None, Some(_)) => VerificationResult::fail("credential names no issuer"),
            (Some(issuer), Some(list)) if list.is_trusted(issuer) => {
                VerificationResult::pass(format!("issuer {issuer} is trusted"))
            }
            (Some(issuer), Some(_)) => {
                VerificationResult::fail(format!("issuer {issuer} is not trusted"))
            }
        };
        let trusted = result.is_pass();
        report.record("trust", result);
        if !trusted {
            return report;
        }
    }

    if let Some(status) = &inputs.revocation {
        report.record("revocation", status.to_verification_result());
        if status.is_revoked() {
            return report;
        }
    }

    let expiry = match credential.is_expired_at(now) {
        Ok(false) => VerificationResult::pass("credential is not expired"),
        Ok(true) => VerificationResult::fail("credential is expired"),
        Err(e) => VerificationResult::fail(e.to_string()),
    };
    report.record("expiry", expiry);

    let known = credential.is_known(inputs.supported_types.as_deref());
    let type_label = report
        .credential_type
        .as_ref()
        .map_or_else(|| "none".to_string(), |t| t.to_string());
    let type_check = if known {
        VerificationResult::pass(format!("type {type_label} is supported"))
    } else {
        VerificationResult::fail(format!("type {type_label} is not supported"))
    };
    report.record("type", type_check);

    if let Some(rule_set) = &inputs.rule_set {
        let engine = RuleEngine::with_clock(FixedClock(now));
        let evaluation = engine.evaluate_rule_set(credential, rule_set, &inputs.value_sets);
        let message = format!(
            "{} of {} rule(s) passed",
            evaluation.passed.len(),
            rule_set.rules.len()
        );
        match evaluation.verdict {
            Verdict::Pass => report.record("rules", VerificationResult::pass(message)),
            Verdict::Fail => {
                report.failed_rules = evaluation
                    .failed
                    .iter()
                    .map(|rule| FailedRule {
                        id: rule.id.clone(),
                        name: rule.label().to_string(),
                    })
                    .collect();
                report.record("rules", VerificationResult::fail(message));
            }
            Verdict::Unknown => report.push(CheckLine {
                check: "rules",
                status: CheckStatus::Unknown,
                message: "rule evaluation was indeterminate".to_string(),
            }),
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

fn load_inputs(args: &VerifyArgs, config: &CliConfig) -> Result<PolicyInputs> {
    let rule_set = match args.rules.as_ref().or(config.rules.as_ref()) {
        Some(path) => Some(
            hcv_rules::load_rule_set(path)
                .with_context(|| format!("failed to load rules from {}", path.display()))?,
        ),
        None => None,
    };

    let value_set_paths = if args.value_sets.is_empty() {
        &config.value_sets
    } else {
        &args.value_sets
    };
    let mut value_sets = Vec::new();
    for path in value_set_paths {
        value_sets.extend(
            hcv_rules::load_value_sets(path)
                .with_context(|| format!("failed to load value sets from {}", path.display()))?,
        );
    }

    let trust_list = match args.trust_list.as_ref().or(config.trust_list.as_ref()) {
        Some(path) => Some(
            hcv_rules::load_trust_list(path)
                .with_context(|| format!("failed to load trust list from {}", path.display()))?,
        ),
        None => None,
    };

    let revocation = match &args.revocation {
        Some(path) => Some(hcv_rules::load_revocation_status(path).with_context(|| {
            format!("failed to load revocation status from {}", path.display())
        })?),
        None => None,
    };

    let supported_types = if args.supported_types.is_empty() {
        config.supported_types.clone()
    } else {
        Some(args.supported_types.clone())
    }
    .map(|types| types.into_iter().map(CredentialType::new).collect());

    Ok(PolicyInputs {
        rule_set,
        value_sets,
        trust_list,
        revocation,
        supported_types,
        require_trusted_issuer: args.require_trusted_issuer || config.require_trusted_issuer,
    })
}

/// Read and decode a credential file.
pub fn read_credential(path: &Path) -> Result<Credential> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read credential {}", path.display()))?;
    Ok(Credential::decode(&bytes))
}

/// Execute the verify subcommand. Returns the process exit code.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let credential = read_credential(&args.credential)?;
    let inputs = load_inputs(args, config)?;
    let report = verify_credential(&credential, &inputs, &SystemClock);

    tracing::info!(
        outcome = report.outcome.as_str(),
        family = %report.family,
        checks = report.checks.len(),
        "verification complete"
    );

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
    }
    Ok(report.outcome.exit_code())
}
