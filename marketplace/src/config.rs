//! Configuration management for the marketplace.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Cart persistence
    pub cart: CartConfig,
    /// Checkout validation
    pub checkout: CheckoutConfig,
    /// Logging
    pub log: LogConfig,
}

/// Cart persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Key of the persisted cart record
    pub storage_key: String,
    /// Directory for file-backed persistence; in-memory when unset
    pub storage_dir: Option<String>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: "tikiti.cart".to_string(),
            storage_dir: None,
        }
    }
}

/// Checkout validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Country calling code prefixed to normalised phone numbers
    pub country_code: String,
    /// Minimum trimmed length of the buyer's name
    pub min_name_length: usize,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            country_code: "254".to_string(),
            min_name_length: 2,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            cart: CartConfig {
                storage_key: lookup("TIKITI_CART_STORAGE_KEY")
                    .filter(|key| !key.trim().is_empty())
                    .unwrap_or(defaults.cart.storage_key),
                storage_dir: lookup("TIKITI_CART_DIR").filter(|dir| !dir.trim().is_empty()),
            },
            checkout: CheckoutConfig {
                country_code: lookup("TIKITI_COUNTRY_CODE")
                    .map(|code| code.trim().trim_start_matches('+').to_string())
                    .filter(|code| !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()))
                    .unwrap_or(defaults.checkout.country_code),
                min_name_length: lookup("TIKITI_MIN_NAME_LENGTH")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.checkout.min_name_length),
            },
            log: LogConfig {
                level: lookup("RUST_LOG").unwrap_or(defaults.log.level),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));

        assert_eq!(config, Config::default());
        assert_eq!(config.cart.storage_key, "tikiti.cart");
        assert_eq!(config.checkout.country_code, "254");
        assert_eq!(config.checkout.min_name_length, 2);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TIKITI_CART_STORAGE_KEY", "cart.v2"),
            ("TIKITI_CART_DIR", "/var/lib/tikiti"),
            ("TIKITI_COUNTRY_CODE", "+255"),
            ("TIKITI_MIN_NAME_LENGTH", "3"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.cart.storage_key, "cart.v2");
        assert_eq!(config.cart.storage_dir.as_deref(), Some("/var/lib/tikiti"));
        assert_eq!(config.checkout.country_code, "255");
        assert_eq!(config.checkout.min_name_length, 3);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("TIKITI_CART_STORAGE_KEY", "  "),
            ("TIKITI_CART_DIR", ""),
            ("TIKITI_COUNTRY_CODE", "KE"),
            ("TIKITI_MIN_NAME_LENGTH", "two"),
        ]));

        assert_eq!(config, Config::default());
    }
}
