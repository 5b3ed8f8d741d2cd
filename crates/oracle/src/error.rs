//! Oracle error types

use lendbank_core::AssetId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Oracle-related errors
///
/// Every variant makes a quote unusable for risk decisions.
#[derive(Debug, Error)]
pub enum OracleError {
    /// No feed configured for the asset
    #[error("Price feed not found: {asset}")]
    PriceNotFound { asset: AssetId },

    /// Price is older than the configured bound
    #[error("Stale price for {asset}: published at {publish_time}, now {now}, max age {max_age_secs}s")]
    StalePrice {
        asset: AssetId,
        publish_time: i64,
        now: i64,
        max_age_secs: u64,
    },

    /// Confidence interval too wide relative to the price
    #[error("Confidence too wide for {asset}: ±{confidence} on {price} exceeds {max_ratio}")]
    ConfidenceTooWide {
        asset: AssetId,
        price: Decimal,
        confidence: Decimal,
        max_ratio: Decimal,
    },

    /// Price data is invalid
    #[error("Invalid price for {asset}: {reason}")]
    InvalidPrice { asset: AssetId, reason: String },

    /// The feed itself failed to answer
    #[error("Oracle feed unavailable: {source}")]
    Unavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
