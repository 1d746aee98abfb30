//! Registry configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a TOML
//! document, and `REGISTRY_*` environment variables.
//!
//! ```toml
//! store_buffer = 64
//! max_page_size = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const STORE_BUFFER_ENV: &str = "REGISTRY_STORE_BUFFER";
pub const MAX_PAGE_SIZE_ENV: &str = "REGISTRY_MAX_PAGE_SIZE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Capacity of the store actor's request channel.
    pub store_buffer: usize,
    /// Longest page a paged read returns.
    pub max_page_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_buffer: 32,
            max_page_size: crate::service::DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)?.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Blank values are ignored.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = positive(&lookup, STORE_BUFFER_ENV)? {
            self.store_buffer = v;
        }
        if let Some(v) = positive(&lookup, MAX_PAGE_SIZE_ENV)? {
            self.max_page_size = v;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("store_buffer", self.store_buffer),
            ("max_page_size", self.max_page_size),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<usize>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.store_buffer, 32);
        assert_eq!(config.max_page_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RegistryConfig::from_toml_str("max_page_size = 50").unwrap();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.store_buffer, 32);
    }

    #[test]
    fn test_toml_rejects_zero_and_unknown_keys() {
        assert!(matches!(
            RegistryConfig::from_toml_str("store_buffer = 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RegistryConfig::from_toml_str("buffer = 8"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides_win() {
        let env = HashMap::from([
            (STORE_BUFFER_ENV, "8".to_string()),
            (MAX_PAGE_SIZE_ENV, "  ".to_string()),
        ]);
        let config = RegistryConfig::default()
            .apply_overrides(|name| env.get(name).cloned())
            .unwrap();
        assert_eq!(config.store_buffer, 8);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn test_bad_override() {
        let err = RegistryConfig::default()
            .apply_overrides(|name| (name == MAX_PAGE_SIZE_ENV).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(MAX_PAGE_SIZE_ENV));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            RegistryConfig::load("/nonexistent/registry.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
