//! Operation receipts

use chrono::{DateTime, Utc};
use lendbank_core::{AssetId, UserId};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::transfer::TransferReceipt;

/// State-changing user operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

/// A user's standing in one bank, valued at the time of the read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalances {
    pub asset: AssetId,
    pub deposit_shares: u128,
    pub borrow_shares: u128,
    /// Underlying amount the deposit shares redeem for (rounded down)
    pub redeemable: u64,
    /// Underlying amount owed for the borrow shares (rounded up)
    pub owed: u64,
}

/// Result of a committed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub id: Uuid,
    pub kind: OperationKind,
    pub user: UserId,
    pub asset: AssetId,
    pub amount: u64,
    /// Shares minted (deposit, borrow) or burned (withdraw, repay)
    pub shares: u128,
    /// Balances after the operation
    pub balances: UserBalances,
    pub transfer: TransferReceipt,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_operation_kind_strings() {
        assert_eq!(OperationKind::Deposit.to_string(), "deposit");
        assert_eq!(OperationKind::from_str("repay").unwrap(), OperationKind::Repay);
        assert!(OperationKind::from_str("liquidate").is_err());
        assert_eq!(serde_json::to_string(&OperationKind::Withdraw).unwrap(), "\"withdraw\"");
    }
}
