//! Configuration Module
//!
//! Handles loading option cache settings from environment variables.

use std::env;

use crate::error::{OptionError, Result};
use crate::models::StoreId;

/// Option cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store scope used when an attribute carries no store of its own
    pub default_store_id: StoreId,
    /// Separator between option ids in a multi-value raw value
    pub multi_value_delimiter: char,
    /// Length of generated text columns in flat tables
    pub flat_text_length: u32,
    /// Emit legacy column definitions instead of DDL-typed columns
    pub db_compatible_mode: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EAV_DEFAULT_STORE_ID` - Fallback store scope (default: 0)
    /// - `EAV_MULTI_VALUE_DELIMITER` - Multi-value separator (default: `,`)
    /// - `EAV_FLAT_TEXT_LENGTH` - Flat text column length (default: 255)
    /// - `EAV_DB_COMPATIBLE_MODE` - Legacy flat column types (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_store_id: env::var("EAV_DEFAULT_STORE_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(StoreId)
                .unwrap_or(defaults.default_store_id),
            multi_value_delimiter: env::var("EAV_MULTI_VALUE_DELIMITER")
                .ok()
                .and_then(|v| {
                    let mut chars = v.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => None,
                    }
                })
                .unwrap_or(defaults.multi_value_delimiter),
            flat_text_length: env::var("EAV_FLAT_TEXT_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.flat_text_length),
            db_compatible_mode: env::var("EAV_DB_COMPATIBLE_MODE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.db_compatible_mode),
        }
    }

    /// Rejects settings that would produce unusable schema fragments.
    pub fn validate(&self) -> Result<()> {
        if self.flat_text_length == 0 {
            return Err(OptionError::InvalidConfig(
                "flat text length must be greater than zero".to_string(),
            ));
        }
        if self.multi_value_delimiter.is_ascii_digit() {
            return Err(OptionError::InvalidConfig(format!(
                "multi-value delimiter '{}' collides with option ids",
                self.multi_value_delimiter
            )));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_store_id: StoreId::DEFAULT,
            multi_value_delimiter: ',',
            flat_text_length: 255,
            db_compatible_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_store_id, StoreId(0));
        assert_eq!(config.multi_value_delimiter, ',');
        assert_eq!(config.flat_text_length, 255);
        assert!(!config.db_compatible_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("EAV_DEFAULT_STORE_ID");
        env::remove_var("EAV_MULTI_VALUE_DELIMITER");
        env::remove_var("EAV_FLAT_TEXT_LENGTH");
        env::remove_var("EAV_DB_COMPATIBLE_MODE");

        let config = Config::from_env();
        assert_eq!(config.default_store_id, StoreId(0));
        assert_eq!(config.multi_value_delimiter, ',');
        assert_eq!(config.flat_text_length, 255);
        assert!(!config.db_compatible_mode);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let config = Config {
            flat_text_length: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(OptionError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_digit_delimiter() {
        let config = Config {
            multi_value_delimiter: '7',
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
