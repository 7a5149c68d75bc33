//! Configuration for settlement engine

use crate::{netting::DEFAULT_DUST_THRESHOLD, priority::PriorityRule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Ledger configuration
    pub ledger: ledger_core::Config,

    /// Netting configuration
    pub netting: NettingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            ledger: ledger_core::Config::default(),
            netting: NettingConfig::default(),
        }
    }
}

/// Netting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NettingConfig {
    /// Remaining balance below this is dropped instead of transferred
    pub dust_threshold: Decimal,

    /// Which creditors are repaid first
    pub priority: PriorityRule,
}

impl Default for NettingConfig {
    fn default() -> Self {
        Self {
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            priority: PriorityRule::default(),
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
        let mut config = Config {
            ledger: ledger_core::Config::from_env()?,
            ..Config::default()
        };

        if let Ok(threshold) = std::env::var("SETTLEMENT_DUST_THRESHOLD") {
            config.netting.dust_threshold = threshold.trim().parse().map_err(|e| {
                crate::Error::Config(format!("SETTLEMENT_DUST_THRESHOLD: {}", e))
            })?;
        }

        if let Ok(ids) = std::env::var("SETTLEMENT_PRIORITY_NODES") {
            config.netting.priority = PriorityRule::Nodes { ids: split_list(&ids) };
        } else if let Ok(patterns) = std::env::var("SETTLEMENT_PRIORITY_LABELS") {
            config.netting.priority = PriorityRule::LabelContains {
                patterns: split_list(&patterns),
            };
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "settlement-engine");
        assert_eq!(config.netting.dust_threshold, Decimal::ONE);
        assert_eq!(config.netting.priority, PriorityRule::LeadPayerFlag);
        assert!(!config.ledger.include_unpaid);
    }

    #[test]
    fn test_toml_config() {
        let config: Config = toml::from_str(
            r#"
            [ledger]
            snapshot_path = "trip.json"

            [netting]
            dust_threshold = "2"

            [netting.priority]
            rule = "label_contains"
            patterns = ["Yamada"]
            "#,
        )
        .unwrap();

        assert_eq!(config.netting.dust_threshold, Decimal::new(2, 0));
        assert_eq!(
            config.netting.priority,
            PriorityRule::LabelContains { patterns: vec!["Yamada".to_string()] }
        );
        assert_eq!(
            config.ledger.snapshot_path.as_deref(),
            Some(std::path::Path::new("trip.json"))
        );
        assert_eq!(config.service_name, "settlement-engine");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" F1, ,A "), vec!["F1".to_string(), "A".to_string()]);
    }
}
