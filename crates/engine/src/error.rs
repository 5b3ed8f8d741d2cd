//! Lending engine errors

use lendbank_core::{AssetId, MathError, UserId};
use lendbank_ledger::LedgerError;
use lendbank_oracle::OracleError;
use lendbank_store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::transfer::TransferError;

/// Terminal failures of an engine operation
///
/// None of these are retried internally, and every one of them leaves bank
/// and position state exactly as it was before the operation.
#[derive(Error, Debug)]
pub enum LendingError {
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Bank not found: {0}")]
    BankNotFound(AssetId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Bank already exists: {0}")]
    BankAlreadyExists(AssetId),

    #[error("User already exists: {0}")]
    UserAlreadyExists(UserId),

    #[error("Invalid bank parameters: {0}")]
    InvalidBankParams(#[source] LedgerError),

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

    #[error("Health check failed for {user}: borrow value {borrow_value} exceeds limit {borrow_limit}")]
    HealthCheckFailed {
        user: UserId,
        borrow_value: Decimal,
        borrow_limit: Decimal,
    },

    #[error("Unusable oracle data for {asset}: {source}")]
    StaleOracleData {
        asset: AssetId,
        #[source]
        source: OracleError,
    },

    #[error("Repay of {requested} {asset} exceeds owed {owed}")]
    OverRepay {
        asset: AssetId,
        owed: u64,
        requested: u64,
    },

    #[error("{user} already borrows {held}; cannot also borrow {requested}")]
    BorrowAssetConflict {
        user: UserId,
        held: AssetId,
        requested: AssetId,
    },

    #[error("Asset transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Arithmetic failure: {0}")]
    MathOverflow(#[from] MathError),

    #[error("Ledger inconsistency: {0}")]
    Ledger(#[source] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<LedgerError> for LendingError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ZeroAmount => LendingError::InvalidAmount {
                reason: "amount must be greater than zero".to_string(),
            },
            LedgerError::DustAmount { asset, amount, reason } => LendingError::InvalidAmount {
                reason: format!("{} {}: {}", amount, asset, reason),
            },
            LedgerError::InsufficientBalance {
                asset,
                available,
                requested,
            } => LendingError::InsufficientBalance {
                asset,
                available,
                requested,
            },
            LedgerError::InsufficientLiquidity {
                asset,
                available,
                requested,
            } => LendingError::InsufficientLiquidity {
                asset,
                available,
                requested,
            },
            LedgerError::OverRepay {
                asset,
                owed,
                requested,
            } => LendingError::OverRepay {
                asset,
                owed,
                requested,
            },
            LedgerError::Math(e) => LendingError::MathOverflow(e),
            e @ (LedgerError::InvalidRateParams(_)
            | LedgerError::InvalidLiquidationParams(_)
            | LedgerError::InvalidDecimals { .. }) => LendingError::InvalidBankParams(e),
            e @ LedgerError::ShareUnderflow { .. } => LendingError::Ledger(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_map_to_taxonomy() {
        let err: LendingError = LedgerError::ZeroAmount.into();
        assert!(matches!(err, LendingError::InvalidAmount { .. }));

        let err: LendingError = LedgerError::OverRepay {
            asset: AssetId::sol(),
            owed: 5,
            requested: 6,
        }
        .into();
        assert!(matches!(err, LendingError::OverRepay { owed: 5, requested: 6, .. }));

        let err: LendingError = LedgerError::InvalidRateParams("kink").into();
        assert!(matches!(err, LendingError::InvalidBankParams(_)));

        let err: LendingError = LedgerError::Math(MathError::Overflow).into();
        assert!(matches!(err, LendingError::MathOverflow(MathError::Overflow)));
    }
}
