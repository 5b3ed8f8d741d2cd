//! Core oracle types

use lendbank_core::AssetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// A USD price quote with its uncertainty and publish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Asset being priced
    pub asset: AssetId,
    /// USD price of one whole unit of the asset
    pub price: Decimal,
    /// Half-width of the confidence interval, in USD
    pub confidence: Decimal,
    /// Unix seconds at which the publisher produced this price
    pub publish_time: i64,
}

impl PriceQuote {
    pub fn new(asset: AssetId, price: Decimal, confidence: Decimal, publish_time: i64) -> Self {
        Self {
            asset,
            price,
            confidence,
            publish_time,
        }
    }

    /// Age of the quote at `now`. Quotes published "in the future" have age 0.
    pub fn age_secs(&self, now: i64) -> u64 {
        now.saturating_sub(self.publish_time).max(0) as u64
    }

    /// Confidence as a fraction of price (None for a non-positive price)
    pub fn confidence_ratio(&self) -> Option<Decimal> {
        if self.price <= Decimal::ZERO {
            None
        } else {
            Some(self.confidence / self.price)
        }
    }
}

/// Price Oracle trait - read-only interface to an external price feed
///
/// Calls are synchronous and issued at most once per price per operation;
/// implementations must not retry internally.
pub trait PriceOracle: Send + Sync {
    /// Latest quote for `asset` as observed at `now` (unix seconds)
    fn get_price(&self, asset: &AssetId, now: i64) -> Result<PriceQuote, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_age_secs() {
        let quote = PriceQuote::new(AssetId::sol(), dec!(150), dec!(0.1), 1_000);
        assert_eq!(quote.age_secs(1_060), 60);
        assert_eq!(quote.age_secs(900), 0);
    }

    #[test]
    fn test_confidence_ratio() {
        let quote = PriceQuote::new(AssetId::sol(), dec!(200), dec!(2), 0);
        assert_eq!(quote.confidence_ratio(), Some(dec!(0.01)));

        let zero = PriceQuote::new(AssetId::sol(), Decimal::ZERO, dec!(2), 0);
        assert_eq!(zero.confidence_ratio(), None);
    }
}
