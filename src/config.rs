//! Configuration Module
//!
//! Handles loading and validating cache engine configuration.

use std::env;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Largest accepted `expiration`, in seconds: the TTL must fit in signed
/// Unix microseconds.
pub const MAX_EXPIRATION: u64 = i64::MAX as u64 / 1_000_000;

/// Cache engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults,
/// or deserialized from an application config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LruConfig {
    /// Maximum number of live entries the cache can hold
    pub max_size: usize,
    /// TTL in seconds applied to entries and to the access tracker
    pub expiration: u64,
    /// Fraction of capacity evicted per over-capacity event
    pub clean_ratio: f64,
    /// Delete accumulated stat counters when the engine is constructed
    pub clear_stat: bool,
}

impl LruConfig {
    /// Creates a new LruConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_LRU_MAX_SIZE` - Maximum cache entries (default: 1024)
    /// - `REDIS_LRU_EXPIRATION` - Entry TTL in seconds (default: 900)
    /// - `REDIS_LRU_CLEAN_RATIO` - Eviction batch ratio (default: 0.1)
    /// - `REDIS_LRU_CLEAR_STAT` - Clear counters on startup (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env::var("REDIS_LRU_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            expiration: env::var("REDIS_LRU_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expiration),
            clean_ratio: env::var("REDIS_LRU_CLEAN_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.clean_ratio),
            clear_stat: env::var("REDIS_LRU_CLEAR_STAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.clear_stat),
        }
    }

    /// Shorthand for a default config with the given capacity and TTL.
    pub fn new(max_size: usize, expiration: u64) -> Self {
        Self {
            max_size,
            expiration,
            ..Self::default()
        }
    }

    /// Sets the eviction batch ratio.
    pub fn with_clean_ratio(mut self, clean_ratio: f64) -> Self {
        self.clean_ratio = clean_ratio;
        self
    }

    /// Requests that stat counters be cleared at construction.
    pub fn with_clear_stat(mut self, clear_stat: bool) -> Self {
        self.clear_stat = clear_stat;
        self
    }

    /// Checks that every field is within its accepted range.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::Configuration(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.expiration == 0 {
            return Err(CacheError::Configuration(
                "expiration must be at least one second".to_string(),
            ));
        }
        if self.expiration > MAX_EXPIRATION {
            return Err(CacheError::Configuration(format!(
                "expiration must be at most {} seconds, got {}",
                MAX_EXPIRATION, self.expiration
            )));
        }
        if !(0.0..=1.0).contains(&self.clean_ratio) {
            return Err(CacheError::Configuration(format!(
                "clean_ratio must be within [0, 1], got {}",
                self.clean_ratio
            )));
        }
        Ok(())
    }

    /// Number of keys evicted per over-capacity event, before the inclusive
    /// rank boundary adds one.
    pub fn once_clean_size(&self) -> usize {
        (self.max_size as f64 * self.clean_ratio).floor() as usize
    }
}

impl Default for LruConfig {
    fn default() -> Self {
        Self {
            max_size: 1024,
            expiration: 15 * 60,
            clean_ratio: 0.1,
            clear_stat: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LruConfig::default();
        assert_eq!(config.max_size, 1024);
        assert_eq!(config.expiration, 900);
        assert_eq!(config.clean_ratio, 0.1);
        assert!(!config.clear_stat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("REDIS_LRU_MAX_SIZE");
        env::remove_var("REDIS_LRU_EXPIRATION");
        env::remove_var("REDIS_LRU_CLEAN_RATIO");
        env::remove_var("REDIS_LRU_CLEAR_STAT");

        let config = LruConfig::from_env();
        assert_eq!(config, LruConfig::default());
    }

    #[test]
    fn test_once_clean_size_floors() {
        assert_eq!(LruConfig::new(3, 60).once_clean_size(), 0);
        assert_eq!(LruConfig::new(1024, 60).once_clean_size(), 102);
        assert_eq!(LruConfig::new(10, 60).with_clean_ratio(0.25).once_clean_size(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            LruConfig::new(0, 60).validate(),
            Err(CacheError::Configuration(_))
        ));
        assert!(matches!(
            LruConfig::new(10, 0).validate(),
            Err(CacheError::Configuration(_))
        ));
        assert!(LruConfig::new(10, 60).with_clean_ratio(1.5).validate().is_err());
        assert!(LruConfig::new(10, 60).with_clean_ratio(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_bounds_expiration() {
        assert!(LruConfig::new(10, MAX_EXPIRATION).validate().is_ok());
        assert!(matches!(
            LruConfig::new(10, MAX_EXPIRATION + 1).validate(),
            Err(CacheError::Configuration(_))
        ));
        assert!(LruConfig::new(10, u64::MAX).validate().is_err());
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let config: LruConfig = serde_json::from_str(r#"{"max_size": 16}"#).unwrap();
        assert_eq!(config.max_size, 16);
        assert_eq!(config.expiration, 900);
        assert_eq!(config.clean_ratio, 0.1);
    }
}
