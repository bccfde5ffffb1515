//! # Facter Configuration
//!
//! A single YAML file (optional) with defaults for every field:
//!
//! ```yaml
//! scope_prefix: "tst-"
//! defaults:
//!   environment: prod
//!   region_alias: sin
//! storage:
//!   mode: s3            # or local
//!   volume: /mnt/automation
//!   bucket_region: ap-southeast-1
//!   artefact_bucket_pattern: "{scope}{client}-core-automation-artefacts"
//! ```
//!
//! `FACTER_SCOPE_PREFIX` overrides `scope_prefix`.

mod storage;

pub use storage::{StorageConfig, StorageMode};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::domain::EnvironmentDeriver;
use crate::error::ConfigError;

/// Environment variable overriding the scope prefix
pub const SCOPE_PREFIX_ENV: &str = "FACTER_SCOPE_PREFIX";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FacterConfig {
    /// Automation scope prefix for table and bucket names (e.g., "tst-")
    #[serde(default)]
    pub scope_prefix: String,

    /// Fallbacks for environment derivation
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Artefact storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Fallback environment and region alias
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Environment for `master`/`main` and underivable branches
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Region alias when the branch names none
    #[serde(default = "default_region_alias")]
    pub region_alias: String,
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_region_alias() -> String {
    "sin".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            region_alias: default_region_alias(),
        }
    }
}

impl FacterConfig {
    /// Load from a file (or defaults), apply env overrides, validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(std::env::var(SCOPE_PREFIX_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("{}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "Loaded facter config");
        Self::from_yaml(&content)
    }

    /// Parse YAML content (no validation)
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Apply the scope prefix override when set
    pub fn apply_overrides(&mut self, scope_prefix: Option<String>) {
        if let Some(prefix) = scope_prefix {
            self.scope_prefix = prefix;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.environment.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "defaults.environment".to_string(),
            });
        }
        if self.defaults.region_alias.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "defaults.region_alias".to_string(),
            });
        }
        if !self.storage.artefact_bucket_pattern.contains("{client}") {
            return Err(ConfigError::InvalidValue {
                field: "storage.artefact_bucket_pattern".to_string(),
                value: self.storage.artefact_bucket_pattern.clone(),
            });
        }
        if self.storage.bucket_region.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "storage.bucket_region".to_string(),
            });
        }
        if self.storage.mode == StorageMode::Local
            && self.storage.volume.as_deref().map_or(true, |v| v.trim().is_empty())
        {
            return Err(ConfigError::MissingField {
                field: "storage.volume".to_string(),
            });
        }
        Ok(())
    }

    /// Environment deriver seeded with the configured fallbacks
    pub fn environment_deriver(&self) -> EnvironmentDeriver {
        EnvironmentDeriver::new(&self.defaults.environment, &self.defaults.region_alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = FacterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scope_prefix, "");
        assert_eq!(config.defaults.environment, "prod");
        assert_eq!(config.defaults.region_alias, "sin");
        assert_eq!(config.storage.mode, StorageMode::S3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = FacterConfig::from_yaml("scope_prefix: tst-\ndefaults:\n  region_alias: use1\n")
            .unwrap();
        assert_eq!(config.scope_prefix, "tst-");
        assert_eq!(config.defaults.environment, "prod");
        assert_eq!(config.defaults.region_alias, "use1");
        assert_eq!(config.storage.bucket_region, "ap-southeast-1");
    }

    #[test]
    fn test_local_mode_requires_volume() {
        let config = FacterConfig::from_yaml("storage:\n  mode: local\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { ref field }) if field == "storage.volume"
        ));

        let config =
            FacterConfig::from_yaml("storage:\n  mode: local\n  volume: /mnt/automation\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bucket_pattern_must_name_client() {
        let config =
            FacterConfig::from_yaml("storage:\n  artefact_bucket_pattern: shared-bucket\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_override_replaces_scope_prefix() {
        let mut config = FacterConfig::from_yaml("scope_prefix: tst-\n").unwrap();
        config.apply_overrides(None);
        assert_eq!(config.scope_prefix, "tst-");
        config.apply_overrides(Some("dev-".to_string()));
        assert_eq!(config.scope_prefix, "dev-");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "defaults:\n  environment: production").unwrap();

        let config = FacterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.defaults.environment, "production");
        assert_eq!(config.environment_deriver().derive("main").environment, "production");
    }

    #[test]
    fn test_missing_file() {
        let err = FacterConfig::load(Some(Path::new("/nonexistent/facter.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            FacterConfig::from_yaml("defaults: [unclosed"),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
