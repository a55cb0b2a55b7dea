//! CLI configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. An optional config file (`--config PATH`, YAML or JSON).
//! 2. Environment variables:
//!    - `HCV_SUPPORTED_TYPES`: comma-separated type identifiers; blank
//!      means unset
//!    - `HCV_REQUIRE_TRUSTED_ISSUER`: `true` or `false`
//! 3. Command-line flags (applied by the subcommands).

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable listing supported credential types.
pub const ENV_SUPPORTED_TYPES: &str = "HCV_SUPPORTED_TYPES";
/// Environment variable toggling the trusted-issuer requirement.
pub const ENV_REQUIRE_TRUSTED_ISSUER: &str = "HCV_REQUIRE_TRUSTED_ISSUER";

/// Resolved CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Allow-list for the type check. `None` accepts any known type.
    #[serde(default)]
    pub supported_types: Option<Vec<String>>,
    /// Default rule set document.
    #[serde(default)]
    pub rules: Option<PathBuf>,
    /// Default value set documents.
    #[serde(default)]
    pub value_sets: Vec<PathBuf>,
    /// Default trust list document.
    #[serde(default)]
    pub trust_list: Option<PathBuf>,
    /// Reject credentials whose issuer is not on the trust list.
    #[serde(default)]
    pub require_trusted_issuer: bool,
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl CliConfig {
    /// Read a config file. YAML parsing also accepts JSON documents.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the file if given, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|var| std::env::var(var).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SUPPORTED_TYPES) {
            let types: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            // A blank list would reject every credential; treat it as unset.
            if !types.is_empty() {
                self.supported_types = Some(types);
            }
        }
        if let Some(raw) = lookup(ENV_REQUIRE_TRUSTED_ISSUER) {
            self.require_trusted_issuer = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_REQUIRE_TRUSTED_ISSUER,
                        value: raw,
                    })
                }
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcv.yaml");
        std::fs::write(
            &path,
            "supported_types: [vaccination, test]\nrules: rules.json\nvalue_sets: [vs.json]\nrequire_trusted_issuer: true\n",
        )
        .unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(
            config.supported_types,
            Some(vec!["vaccination".to_string(), "test".to_string()])
        );
        assert_eq!(config.rules, Some(PathBuf::from("rules.json")));
        assert_eq!(config.value_sets, [PathBuf::from("vs.json")]);
        assert!(config.require_trusted_issuer);
        assert_eq!(config.trust_list, None);
    }

    #[test]
    fn json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcv.json");
        std::fs::write(&path, r#"{"trust_list": "trust.json"}"#).unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.trust_list, Some(PathBuf::from("trust.json")));
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcv.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(CliConfig::from_file(&path).unwrap(), CliConfig::default());
    }

    #[test]
    fn unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcv.yaml");
        std::fs::write(&path, "rulez: rules.json\n").unwrap();
        assert!(matches!(
            CliConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            CliConfig::from_file(Path::new("/nonexistent/hcv.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let config = CliConfig::default()
            .with_env(|var| match var {
                ENV_SUPPORTED_TYPES => Some(" vaccination , recovery,".to_string()),
                ENV_REQUIRE_TRUSTED_ISSUER => Some("TRUE".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            config.supported_types,
            Some(vec!["vaccination".to_string(), "recovery".to_string()])
        );
        assert!(config.require_trusted_issuer);
    }

    #[test]
    fn env_absent_keeps_file_values() {
        let config = CliConfig {
            require_trusted_issuer: true,
            ..CliConfig::default()
        };
        assert_eq!(config.clone().with_env(no_env).unwrap(), config);
    }

    #[test]
    fn blank_supported_types_env_is_unset() {
        let from_file = CliConfig {
            supported_types: Some(vec!["vaccination".to_string()]),
            ..CliConfig::default()
        };
        for raw in ["", "  ", " , "] {
            let config = from_file
                .clone()
                .with_env(|var| (var == ENV_SUPPORTED_TYPES).then(|| raw.to_string()))
                .unwrap();
            assert_eq!(config.supported_types, from_file.supported_types);
        }
        let config = CliConfig::default()
            .with_env(|var| (var == ENV_SUPPORTED_TYPES).then(String::new))
            .unwrap();
        assert_eq!(config.supported_types, None);
    }

    #[test]
    fn invalid_env_bool() {
        let err = CliConfig::default()
            .with_env(|var| (var == ENV_REQUIRE_TRUSTED_ISSUER).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_REQUIRE_TRUSTED_ISSUER));
    }
}
