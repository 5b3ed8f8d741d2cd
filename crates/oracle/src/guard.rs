//! Fail-closed validation of oracle quotes
//!
//! A quote that is too old, too uncertain, or non-positive never reaches a
//! risk decision.

use lendbank_core::AssetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::types::{PriceOracle, PriceQuote};

/// Staleness and confidence bounds applied to every price read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Maximum age of a quote, in seconds
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Maximum confidence interval as a fraction of price (0.02 = 2%)
    #[serde(default = "default_max_confidence_ratio")]
    pub max_confidence_ratio: Decimal,
}

fn default_max_age_secs() -> u64 {
    100
}

fn default_max_confidence_ratio() -> Decimal {
    Decimal::new(2, 2)
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            max_confidence_ratio: default_max_confidence_ratio(),
        }
    }
}

/// Wraps reads from a `PriceOracle` with the configured bounds
#[derive(Debug, Clone, Default)]
pub struct OracleGuard {
    config: OracleConfig,
}

impl OracleGuard {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Read a price and reject it unless it is fresh and tight enough
    pub fn price(
        &self,
        oracle: &dyn PriceOracle,
        asset: &AssetId,
        now: i64,
    ) -> Result<PriceQuote, OracleError> {
        let quote = oracle.get_price(asset, now)?;
        self.validate(asset, &quote, now)?;
        Ok(quote)
    }

    /// Validate an already-fetched quote
    pub fn validate(&self, asset: &AssetId, quote: &PriceQuote, now: i64) -> Result<(), OracleError> {
        if &quote.asset != asset {
            return Err(OracleError::InvalidPrice {
                asset: asset.clone(),
                reason: format!("feed returned a quote for {}", quote.asset),
            });
        }

        if quote.age_secs(now) > self.config.max_age_secs {
            tracing::warn!(
                asset = %asset,
                publish_time = quote.publish_time,
                now,
                max_age_secs = self.config.max_age_secs,
                "Rejecting stale price"
            );
            return Err(OracleError::StalePrice {
                asset: asset.clone(),
                publish_time: quote.publish_time,
                now,
                max_age_secs: self.config.max_age_secs,
            });
        }

        let ratio = quote.confidence_ratio().ok_or_else(|| OracleError::InvalidPrice {
            asset: asset.clone(),
            reason: format!("non-positive price {}", quote.price),
        })?;

        if quote.confidence < Decimal::ZERO {
            return Err(OracleError::InvalidPrice {
                asset: asset.clone(),
                reason: format!("negative confidence {}", quote.confidence),
            });
        }

        if ratio > self.config.max_confidence_ratio {
            tracing::warn!(
                asset = %asset,
                price = %quote.price,
                confidence = %quote.confidence,
                "Rejecting low-confidence price"
            );
            return Err(OracleError::ConfidenceTooWide {
                asset: asset.clone(),
                price: quote.price,
                confidence: quote.confidence,
                max_ratio: self.config.max_confidence_ratio,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockOracle;
    use rust_decimal_macros::dec;

    fn guard() -> OracleGuard {
        OracleGuard::new(OracleConfig {
            max_age_secs: 60,
            max_confidence_ratio: dec!(0.01),
        })
    }

    #[test]
    fn test_fresh_price_accepted() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::sol(), dec!(150), dec!(0.5), 1_000);

        let quote = guard().price(&oracle, &AssetId::sol(), 1_060).unwrap();
        assert_eq!(quote.price, dec!(150));
    }

    #[test]
    fn test_stale_price_rejected() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::sol(), dec!(150), dec!(0.5), 1_000);

        let result = guard().price(&oracle, &AssetId::sol(), 1_061);
        assert!(matches!(result, Err(OracleError::StalePrice { .. })));
    }

    #[test]
    fn test_wide_confidence_rejected() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::sol(), dec!(100), dec!(1.5), 1_000);

        let result = guard().price(&oracle, &AssetId::sol(), 1_000);
        assert!(matches!(result, Err(OracleError::ConfidenceTooWide { .. })));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::sol(), Decimal::ZERO, Decimal::ZERO, 1_000);

        let result = guard().price(&oracle, &AssetId::sol(), 1_000);
        assert!(matches!(result, Err(OracleError::InvalidPrice { .. })));
    }

    #[test]
    fn test_config_partial_json() {
        let config: OracleConfig = serde_json::from_str(r#"{ "max_age_secs": 30 }"#).unwrap();
        assert_eq!(config.max_age_secs, 30);
        assert_eq!(config.max_confidence_ratio, dec!(0.02));
    }
}
