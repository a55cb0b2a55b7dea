//! Rule-evaluation error types.
//!
//! [`LogicError`] covers predicate compilation and application; the engine
//! resolves it locally to a failed rule. [`PolicyError`] covers loading
//! policy documents and carries the file path.

use std::path::PathBuf;

use thiserror::Error;

/// Errors compiling or applying a predicate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LogicError {
    /// The predicate text is not JSON.
    #[error("predicate is not valid JSON: {0}")]
    InvalidJson(String),

    /// An object names an operator the interpreter does not know.
    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    /// An operation object must have exactly one key.
    #[error("operation object must have exactly one key, found {0:?}")]
    MultipleOperators(Vec<String>),

    /// Wrong number of arguments for a fixed-arity operator.
    #[error("operator {op:?} expects {expected} argument(s), found {found}")]
    Arity {
        op: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// The predicate nests deeper than the interpreter allows.
    #[error("predicate nests deeper than {0} levels")]
    TooDeep(usize),

    /// An operand had a shape the operator cannot work with.
    #[error("invalid operand for {op:?}: {reason}")]
    InvalidOperand { op: &'static str, reason: String },
}

/// Errors loading policy documents.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A required file was not found.
    #[error("policy document not found: {path}")]
    FileNotFound { path: PathBuf },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The file extension names no supported format.
    #[error("unsupported policy document format at {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for policy loading.
pub type PolicyResult<T> = Result<T, PolicyError>;
