//! Ledger errors

use lendbank_core::{AssetId, MathError};
use thiserror::Error;

/// Errors that can occur in bank and position arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Amount {amount} of {asset} rejected: {reason}")]
    DustAmount {
        asset: AssetId,
        amount: u64,
        reason: &'static str,
    },

    #[error("Insufficient balance of {asset}: available {available}, requested {requested}")]
    InsufficientBalance {
        asset: AssetId,
        available: u64,
        requested: u64,
    },

    #[error("Insufficient liquidity in {asset} bank: available {available}, requested {requested}")]
    InsufficientLiquidity {
        asset: AssetId,
        available: u64,
        requested: u64,
    },

    #[error("Repay of {requested} {asset} exceeds owed {owed}")]
    OverRepay {
        asset: AssetId,
        owed: u64,
        requested: u64,
    },

    #[error("Share balance of {asset} too small: held {held}, required {required}")]
    ShareUnderflow {
        asset: AssetId,
        held: u128,
        required: u128,
    },

    #[error("Invalid interest rate parameters: {0}")]
    InvalidRateParams(&'static str),

    #[error("Invalid decimals {found}: at most {max} supported")]
    InvalidDecimals { found: u8, max: u8 },

    #[error("Invalid liquidation parameters: {0}")]
    InvalidLiquidationParams(&'static str),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}
