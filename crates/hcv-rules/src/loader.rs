//! Policy document loading.
//!
//! Rule sets, value sets, trust lists and revocation status arrive as JSON
//! or YAML files. The format is chosen from the file extension (`.json`,
//! `.yaml`, `.yml`); anything else is rejected. Every error carries the
//! path it came from.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use hcv_credential::RevocationStatus;

use crate::error::{PolicyError, PolicyResult};
use crate::model::{RuleSet, TrustList, ValueSet};

enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> PolicyResult<Format> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Ok(Format::Json),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        _ => Err(PolicyError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn read(path: &Path) -> PolicyResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PolicyError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PolicyError::Io(e)
        }
    })
}

/// Load any policy document into a strongly-typed value.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> PolicyResult<T> {
    let format = format_of(path)?;
    let content = read(path)?;
    let document = match format {
        Format::Json => serde_json::from_str(&content).map_err(|e| PolicyError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| PolicyError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })?,
    };
    tracing::debug!(path = %path.display(), "loaded policy document");
    Ok(document)
}

/// Load a rule set.
pub fn load_rule_set(path: &Path) -> PolicyResult<RuleSet> {
    load_document(path)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Load value sets. The document may hold a single value set or an array.
pub fn load_value_sets(path: &Path) -> PolicyResult<Vec<ValueSet>> {
    Ok(match load_document::<OneOrMany<ValueSet>>(path)? {
        OneOrMany::Many(sets) => sets,
        OneOrMany::One(set) => vec![set],
    })
}

/// Load an issuer trust list.
pub fn load_trust_list(path: &Path) -> PolicyResult<TrustList> {
    load_document(path)
}

/// Load a revocation status record.
pub fn load_revocation_status(path: &Path) -> PolicyResult<RevocationStatus> {
    load_document(path)
}
