//! LendBank Store - Keyed state persistence
//!
//! Banks are keyed by `AssetId`, positions by `UserId`. The engine is the
//! only writer and commits each operation as one `StateBatch`.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use lendbank_core::{AssetId, UserId};
use lendbank_ledger::{Bank, UserPosition};

/// Records written together by one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateBatch {
    pub banks: Vec<Bank>,
    pub positions: Vec<UserPosition>,
}

impl StateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bank(mut self, bank: Bank) -> Self {
        self.banks.push(bank);
        self
    }

    pub fn with_position(mut self, position: UserPosition) -> Self {
        self.positions.push(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty() && self.positions.is_empty()
    }
}

/// Keyed state store
///
/// `commit` must apply the whole batch or nothing.
pub trait StateStore {
    fn bank(&self, asset: &AssetId) -> Result<Option<Bank>, StoreError>;

    fn position(&self, user: &UserId) -> Result<Option<UserPosition>, StoreError>;

    fn banks(&self) -> Result<Vec<Bank>, StoreError>;

    fn positions(&self) -> Result<Vec<UserPosition>, StoreError>;

    fn commit(&mut self, batch: StateBatch) -> Result<(), StoreError>;
}
