//! Configuration for the capability core
//!
//! Loaded from TOML, then overridden from `HEARTH_*` environment variables, then validated.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{HearthError, Result};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "HEARTH_";

/// Tunables for secret generation and chain walks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Bytes of entropy in each generated secret
    pub secret_length: usize,
    /// Maximum number of parent links a restore may follow
    pub max_chain_depth: usize,
    /// Maximum nesting of `tokenValid` requirements
    pub max_requirement_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            secret_length: 32,
            max_chain_depth: 64,
            max_requirement_depth: 32,
        }
    }
}

impl CoreConfig {
    /// Minimum accepted secret entropy, in bytes
    pub const MIN_SECRET_LENGTH: usize = 16;

    /// Default configuration values
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HearthError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `HEARTH_SECRET_LENGTH`, `HEARTH_MAX_CHAIN_DEPTH` and
    /// `HEARTH_MAX_REQUIREMENT_DEPTH` from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from an explicit set of variables
    pub fn merge_with_vars(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                self.set_from_string(&name.to_lowercase(), &value)?;
            }
        }
        Ok(())
    }

    /// Set one field by name; unknown names are ignored
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        let parse = |value: &str| {
            value
                .parse::<usize>()
                .map_err(|e| HearthError::invalid(format!("{key}: {e}")))
        };
        match key {
            "secret_length" => self.secret_length = parse(value)?,
            "max_chain_depth" => self.max_chain_depth = parse(value)?,
            "max_requirement_depth" => self.max_requirement_depth = parse(value)?,
            _ => {}
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.secret_length < Self::MIN_SECRET_LENGTH {
            return Err(HearthError::invalid(format!(
                "secret_length must be at least {} bytes, got {}",
                Self::MIN_SECRET_LENGTH,
                self.secret_length
            )));
        }
        if self.max_chain_depth == 0 {
            return Err(HearthError::invalid("max_chain_depth must be positive"));
        }
        if self.max_requirement_depth == 0 {
            return Err(HearthError::invalid("max_requirement_depth must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CoreConfig::defaults().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CoreConfig::from_toml_str("max_chain_depth = 8").unwrap();
        assert_eq!(config.max_chain_depth, 8);
        assert_eq!(config.secret_length, 32);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CoreConfig::default();
        config
            .merge_with_vars(vec![
                ("HEARTH_SECRET_LENGTH".to_string(), "48".to_string()),
                ("OTHER_SECRET_LENGTH".to_string(), "1".to_string()),
            ])
            .unwrap();
        assert_eq!(config.secret_length, 48);

        let err = config
            .merge_with_vars(vec![("HEARTH_MAX_CHAIN_DEPTH".to_string(), "lots".to_string())])
            .unwrap_err();
        assert!(matches!(err, HearthError::Invalid { .. }));
    }

    #[test]
    fn test_weak_secrets_rejected() {
        let config = CoreConfig {
            secret_length: 8,
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "secret_length = 24\nmax_requirement_depth = 4").unwrap();
        let config = CoreConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.secret_length, 24);
        assert_eq!(config.max_requirement_depth, 4);
    }
}
