//! Engine configuration

use serde::Deserialize;

use crate::error::{AclError, Result};

/// Environment variable for the compiled pattern cache capacity
pub const ENV_PATTERN_CACHE_SIZE: &str = "ACL_PATTERN_CACHE_SIZE";
/// Environment variable for the substitution cache capacity
pub const ENV_SUBSTITUTION_CACHE_SIZE: &str = "ACL_SUBSTITUTION_CACHE_SIZE";
/// Environment variable for the access checker cache capacity
pub const ENV_CHECKER_CACHE_SIZE: &str = "ACL_CHECKER_CACHE_SIZE";
/// Environment variable for the shard count of every cache
pub const ENV_CACHE_SHARDS: &str = "ACL_CACHE_SHARDS";

/// ACL engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Capacity of the pattern string → compiled pattern cache
    pub pattern_cache_capacity: usize,

    /// Capacity of the (pattern, subject, session) → substituted pattern cache
    pub substitution_cache_capacity: usize,

    /// Capacity of the (subject, session, grants) → access checker cache
    pub checker_cache_capacity: usize,

    /// Number of independently locked shards per cache
    pub shards: usize,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            pattern_cache_capacity: 10_000,
            substitution_cache_capacity: 10_000,
            checker_cache_capacity: 1_000,
            shards: 16,
        }
    }
}

impl AclConfig {
    /// Loads the configuration from `ACL_*` environment variables,
    /// falling back to defaults for unset ones
    ///
    /// # Errors
    ///
    /// Returns [`AclError::InvalidConfig`] if a variable is set but is not a
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str, default: usize| -> Result<usize> {
            match lookup(name) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    AclError::InvalidConfig(format!("{} must be an integer, got '{}'", name, raw))
                }),
                None => Ok(default),
            }
        };

        let config = Self {
            pattern_cache_capacity: read(ENV_PATTERN_CACHE_SIZE, defaults.pattern_cache_capacity)?,
            substitution_cache_capacity: read(
                ENV_SUBSTITUTION_CACHE_SIZE,
                defaults.substitution_cache_capacity,
            )?,
            checker_cache_capacity: read(ENV_CHECKER_CACHE_SIZE, defaults.checker_cache_capacity)?,
            shards: read(ENV_CACHE_SHARDS, defaults.shards)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero capacities and a zero shard count
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("pattern_cache_capacity", self.pattern_cache_capacity),
            ("substitution_cache_capacity", self.substitution_cache_capacity),
            ("checker_cache_capacity", self.checker_cache_capacity),
            ("shards", self.shards),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(AclError::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    pub fn with_pattern_cache_capacity(mut self, capacity: usize) -> Self {
        self.pattern_cache_capacity = capacity;
        self
    }

    pub fn with_substitution_cache_capacity(mut self, capacity: usize) -> Self {
        self.substitution_cache_capacity = capacity;
        self
    }

    pub fn with_checker_cache_capacity(mut self, capacity: usize) -> Self {
        self.checker_cache_capacity = capacity;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_valid() {
        assert!(AclConfig::default().validate().is_ok());
        assert_eq!(AclConfig::from_lookup(lookup(&[])).unwrap(), AclConfig::default());
    }

    #[test]
    fn test_from_lookup() {
        let config = AclConfig::from_lookup(lookup(&[
            (ENV_PATTERN_CACHE_SIZE, "50"),
            (ENV_CHECKER_CACHE_SIZE, " 5 "),
            (ENV_CACHE_SHARDS, "2"),
        ]))
        .unwrap();

        assert_eq!(config.pattern_cache_capacity, 50);
        assert_eq!(config.substitution_cache_capacity, 10_000);
        assert_eq!(config.checker_cache_capacity, 5);
        assert_eq!(config.shards, 2);
    }

    #[test]
    fn test_invalid_values() {
        let err = AclConfig::from_lookup(lookup(&[(ENV_CACHE_SHARDS, "many")])).unwrap_err();
        assert!(matches!(err, AclError::InvalidConfig(_)));

        let err = AclConfig::from_lookup(lookup(&[(ENV_CHECKER_CACHE_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, AclError::InvalidConfig(_)));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AclConfig = serde_json::from_str(r#"{"shards": 1}"#).unwrap();
        assert_eq!(config.shards, 1);
        assert_eq!(config.checker_cache_capacity, 1_000);
    }
}
