//! AssetId - Type-safe identity of an underlying asset
//!
//! Every bank is keyed by exactly one asset. Codes are normalized to
//! upper case so `"usdc"` and `"USDC"` address the same bank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Empty identifier")]
    Empty,

    #[error("Identifier too long (max {max} chars): {value}")]
    TooLong { value: String, max: usize },

    #[error("Invalid identifier format: {0}")]
    InvalidFormat(String),
}

/// Maximum length of an asset code
pub const MAX_ASSET_CODE_LEN: usize = 10;

/// Asset code (e.g. USDC, SOL)
///
/// # Examples
/// ```
/// use lendbank_core::AssetId;
///
/// let usdc: AssetId = "usdc".parse().unwrap();
/// assert_eq!(usdc, AssetId::usdc());
/// assert_eq!(usdc.to_string(), "USDC");
///
/// assert!("US-DC".parse::<AssetId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Parse and normalize an asset code
    pub fn new(code: impl AsRef<str>) -> Result<Self, IdError> {
        let code = code.as_ref().trim().to_uppercase();

        if code.is_empty() {
            return Err(IdError::Empty);
        }

        if code.len() > MAX_ASSET_CODE_LEN {
            return Err(IdError::TooLong {
                value: code,
                max: MAX_ASSET_CODE_LEN,
            });
        }

        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdError::InvalidFormat(code));
        }

        Ok(Self(code))
    }

    /// USD Coin
    pub fn usdc() -> Self {
        Self("USDC".to_string())
    }

    /// Solana
    pub fn sol() -> Self {
        Self("SOL".to_string())
    }

    /// Returns the asset code as a string slice
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AssetId> for String {
    fn from(asset: AssetId) -> Self {
        asset.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        assert_eq!("sol".parse::<AssetId>().unwrap(), AssetId::sol());
        assert_eq!(" Usdc ".parse::<AssetId>().unwrap(), AssetId::usdc());
    }

    #[test]
    fn test_empty_code_error() {
        assert!(matches!("".parse::<AssetId>(), Err(IdError::Empty)));
    }

    #[test]
    fn test_too_long_error() {
        let result = "VERYLONGASSETNAME".parse::<AssetId>();
        assert!(matches!(result, Err(IdError::TooLong { .. })));
    }

    #[test]
    fn test_invalid_format_error() {
        let result = "SOL/USD".parse::<AssetId>();
        assert!(matches!(result, Err(IdError::InvalidFormat(_))));
    }

    #[test]
    fn test_serde_rejects_invalid_code() {
        let parsed: Result<AssetId, _> = serde_json::from_str("\"BAD CODE\"");
        assert!(parsed.is_err());

        let parsed: AssetId = serde_json::from_str("\"sol\"").unwrap();
        assert_eq!(parsed, AssetId::sol());
    }
}
