//! UserPosition - Per-user share balances
//!
//! Positions only hold shares. The underlying amounts they represent are
//! always computed through the owning `Bank`, so interest reaches every
//! holder without rewriting positions.

use lendbank_core::{AssetId, MathError, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;

/// Share balances of one user across all banks they have touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub user: UserId,
    /// Deposit shares per asset; absent means zero
    #[serde(default)]
    pub deposit_shares: BTreeMap<AssetId, u128>,
    /// Borrow shares per asset; absent means zero
    #[serde(default)]
    pub borrow_shares: BTreeMap<AssetId, u128>,
    /// Unix seconds at which the position was opened
    pub created_at: i64,
}

impl UserPosition {
    pub fn new(user: UserId, created_at: i64) -> Self {
        Self {
            user,
            deposit_shares: BTreeMap::new(),
            borrow_shares: BTreeMap::new(),
            created_at,
        }
    }

    pub fn deposit_shares(&self, asset: &AssetId) -> u128 {
        self.deposit_shares.get(asset).copied().unwrap_or(0)
    }

    pub fn borrow_shares(&self, asset: &AssetId) -> u128 {
        self.borrow_shares.get(asset).copied().unwrap_or(0)
    }

    pub fn credit_deposit(&mut self, asset: &AssetId, shares: u128) -> Result<(), LedgerError> {
        credit(&mut self.deposit_shares, asset, shares)
    }

    pub fn debit_deposit(&mut self, asset: &AssetId, shares: u128) -> Result<(), LedgerError> {
        debit(&mut self.deposit_shares, asset, shares)
    }

    pub fn credit_borrow(&mut self, asset: &AssetId, shares: u128) -> Result<(), LedgerError> {
        credit(&mut self.borrow_shares, asset, shares)
    }

    pub fn debit_borrow(&mut self, asset: &AssetId, shares: u128) -> Result<(), LedgerError> {
        debit(&mut self.borrow_shares, asset, shares)
    }

    /// Assets with non-zero deposit shares
    pub fn deposit_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.deposit_shares.keys()
    }

    /// Assets with non-zero borrow shares
    pub fn borrow_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.borrow_shares.keys()
    }

    /// Whether the position holds any debt
    pub fn has_debt(&self) -> bool {
        !self.borrow_shares.is_empty()
    }

    /// True when no shares of any kind are held
    pub fn is_empty(&self) -> bool {
        self.deposit_shares.is_empty() && self.borrow_shares.is_empty()
    }
}

fn credit(
    book: &mut BTreeMap<AssetId, u128>,
    asset: &AssetId,
    shares: u128,
) -> Result<(), LedgerError> {
    if shares == 0 {
        return Ok(());
    }
    let entry = book.entry(asset.clone()).or_insert(0);
    *entry = entry.checked_add(shares).ok_or(MathError::Overflow)?;
    Ok(())
}

fn debit(
    book: &mut BTreeMap<AssetId, u128>,
    asset: &AssetId,
    shares: u128,
) -> Result<(), LedgerError> {
    if shares == 0 {
        return Ok(());
    }
    let held = book.get(asset).copied().unwrap_or(0);
    let remaining = held.checked_sub(shares).ok_or_else(|| LedgerError::ShareUnderflow {
        asset: asset.clone(),
        held,
        required: shares,
    })?;

    if remaining == 0 {
        book.remove(asset);
    } else {
        book.insert(asset.clone(), remaining);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserPosition {
        UserPosition::new(UserId::new("alice").unwrap(), 0)
    }

    #[test]
    fn test_absent_entries_read_as_zero() {
        let position = alice();
        assert_eq!(position.deposit_shares(&AssetId::usdc()), 0);
        assert_eq!(position.borrow_shares(&AssetId::sol()), 0);
        assert!(position.is_empty());
    }

    #[test]
    fn test_zero_entries_removed() {
        let mut position = alice();
        position.credit_deposit(&AssetId::usdc(), 100).unwrap();
        position.debit_deposit(&AssetId::usdc(), 100).unwrap();
        assert!(position.deposit_shares.is_empty());

        position.credit_borrow(&AssetId::sol(), 5).unwrap();
        assert!(position.has_debt());
        position.debit_borrow(&AssetId::sol(), 5).unwrap();
        assert!(!position.has_debt());
    }

    #[test]
    fn test_debit_more_than_held() {
        let mut position = alice();
        position.credit_deposit(&AssetId::usdc(), 10).unwrap();
        let result = position.debit_deposit(&AssetId::usdc(), 11);
        assert!(matches!(
            result,
            Err(LedgerError::ShareUnderflow { held: 10, required: 11, .. })
        ));
        assert_eq!(position.deposit_shares(&AssetId::usdc()), 10);
    }

    #[test]
    fn test_serde_roundtrip_keeps_shares() {
        let mut position = alice();
        position.credit_deposit(&AssetId::usdc(), 1_000).unwrap();
        position.credit_borrow(&AssetId::sol(), 7).unwrap();

        let json = serde_json::to_string(&position).unwrap();
        let parsed: UserPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, position);
    }
}
