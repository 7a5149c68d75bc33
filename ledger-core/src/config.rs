//! Configuration for the ledger

use crate::types::{BalanceOptions, BalanceView};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Count unpaid expenses as share by default (estimated view)
    pub include_unpaid: bool,

    /// JSON snapshot to read, if the caller does not inject a source
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ledger-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            include_unpaid: false,
            snapshot_path: None,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(path) = std::env::var("LEDGER_SNAPSHOT_PATH") {
            config.snapshot_path = Some(PathBuf::from(path));
        }

        if let Ok(flag) = std::env::var("LEDGER_INCLUDE_UNPAID") {
            config.include_unpaid = parse_flag(&flag).ok_or_else(|| {
                crate::Error::Config(format!("LEDGER_INCLUDE_UNPAID: not a boolean: {}", flag))
            })?;
        }

        Ok(config)
    }

    /// Default balance options
    pub fn balance_options(&self) -> BalanceOptions {
        BalanceOptions {
            include_unpaid: self.include_unpaid,
        }
    }

    /// Default balance view
    pub fn default_view(&self) -> BalanceView {
        self.balance_options().view()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "ledger-core");
        assert!(!config.include_unpaid);
        assert_eq!(config.default_view(), BalanceView::Settled);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str("include_unpaid = true").unwrap();
        assert!(config.include_unpaid);
        assert_eq!(config.service_name, "ledger-core");
        assert_eq!(config.default_view(), BalanceView::Estimated);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
