//! In-memory store

use lendbank_core::{AssetId, UserId};
use lendbank_ledger::{Bank, UserPosition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{StateBatch, StateStore, StoreError};

/// Volatile store backed by ordered maps
///
/// Also the in-memory image of a `JsonFileStore` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    banks: BTreeMap<AssetId, Bank>,
    #[serde(default)]
    positions: BTreeMap<UserId, UserPosition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn apply(&mut self, batch: StateBatch) {
        for bank in batch.banks {
            self.banks.insert(bank.asset.clone(), bank);
        }
        for position in batch.positions {
            self.positions.insert(position.user.clone(), position);
        }
    }
}

impl StateStore for MemoryStore {
    fn bank(&self, asset: &AssetId) -> Result<Option<Bank>, StoreError> {
        Ok(self.banks.get(asset).cloned())
    }

    fn position(&self, user: &UserId) -> Result<Option<UserPosition>, StoreError> {
        Ok(self.positions.get(user).cloned())
    }

    fn banks(&self) -> Result<Vec<Bank>, StoreError> {
        Ok(self.banks.values().cloned().collect())
    }

    fn positions(&self) -> Result<Vec<UserPosition>, StoreError> {
        Ok(self.positions.values().cloned().collect())
    }

    fn commit(&mut self, batch: StateBatch) -> Result<(), StoreError> {
        self.apply(batch);
        Ok(())
    }
}
