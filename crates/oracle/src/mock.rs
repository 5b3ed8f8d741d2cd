//! Mock Oracle for testing
//!
//! Provides configurable fixed quotes for testing health checks.

use lendbank_core::AssetId;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::OracleError;
use crate::types::{PriceOracle, PriceQuote};

/// Mock Price Oracle for testing
///
/// Stores fixed quotes that can be updated programmatically.
#[derive(Debug, Default)]
pub struct MockOracle {
    quotes: RwLock<HashMap<AssetId, PriceQuote>>,
}

impl MockOracle {
    /// Create a new empty mock oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a quote for an asset
    pub fn set_price(&self, asset: AssetId, price: Decimal, confidence: Decimal, publish_time: i64) {
        let quote = PriceQuote::new(asset.clone(), price, confidence, publish_time);
        self.set_quote(quote);
    }

    /// Set a fully specified quote
    pub fn set_quote(&self, quote: PriceQuote) {
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        quotes.insert(quote.asset.clone(), quote);
    }

    /// Remove a quote (for testing feed-not-found)
    pub fn remove_price(&self, asset: &AssetId) {
        let mut quotes = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        quotes.remove(asset);
    }

    /// Get number of configured feeds
    pub fn feed_count(&self) -> usize {
        self.quotes.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl PriceOracle for MockOracle {
    fn get_price(&self, asset: &AssetId, _now: i64) -> Result<PriceQuote, OracleError> {
        let quotes = self.quotes.read().unwrap_or_else(|e| e.into_inner());
        quotes
            .get(asset)
            .cloned()
            .ok_or_else(|| OracleError::PriceNotFound {
                asset: asset.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mock_oracle_set_price() {
        let oracle = MockOracle::new();

        assert!(oracle.get_price(&AssetId::sol(), 0).is_err());

        oracle.set_price(AssetId::sol(), dec!(150), dec!(0.1), 10);

        let quote = oracle.get_price(&AssetId::sol(), 0).unwrap();
        assert_eq!(quote.price, dec!(150));
        assert_eq!(quote.publish_time, 10);
        assert_eq!(oracle.feed_count(), 1);
    }

    #[test]
    fn test_mock_oracle_price_not_found() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::usdc(), dec!(1), dec!(0.001), 0);
        oracle.remove_price(&AssetId::usdc());

        let result = oracle.get_price(&AssetId::usdc(), 0);
        assert!(matches!(result, Err(OracleError::PriceNotFound { .. })));
    }
}
