//! Engine configuration
//!
//! Every field has a serde default, so a partial JSON file (or `{}`) is a
//! valid configuration.

use lendbank_oracle::OracleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the `LendingEngine`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bounds applied to every price read
    #[serde(default)]
    pub oracle: OracleConfig,
}

impl EngineConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, std::io::Error> {
        serde_json::from_str(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.oracle.max_age_secs, 100);
        assert_eq!(config.oracle.max_confidence_ratio, Decimal::new(2, 2));
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(r#"{"oracle": {"max_age_secs": 30}}"#).unwrap();
        assert_eq!(config.oracle.max_age_secs, 30);
        assert_eq!(config.oracle.max_confidence_ratio, Decimal::new(2, 2));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"oracle": {"max_confidence_ratio": "0.05"}}"#).unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.oracle.max_confidence_ratio, Decimal::new(5, 2));
        assert_eq!(config.oracle.max_age_secs, 100);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
