//! JSON snapshot store - restart-safe persistence
//!
//! The full state is rewritten on every commit: serialized, checksummed with
//! SHA-256, written to a temp file, then renamed over the previous snapshot.
//! A crash mid-write leaves the old snapshot intact.

use lendbank_core::{AssetId, UserId};
use lendbank_ledger::{Bank, UserPosition};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::memory::MemoryStore;
use crate::{StateBatch, StateStore, StoreError};

/// Current on-disk format
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_FILE: &str = "state.json";

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: String,
    state: MemoryStore,
}

/// Durable store writing one JSON snapshot per commit
pub struct JsonFileStore {
    path: PathBuf,
    state: MemoryStore,
}

impl JsonFileStore {
    /// Open the store in `dir`, loading an existing snapshot if present
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(SNAPSHOT_FILE);

        let state = if path.exists() {
            load(&path)?
        } else {
            MemoryStore::new()
        };

        tracing::info!(
            path = %path.display(),
            banks = state.bank_count(),
            positions = state.position_count(),
            "Opened state snapshot"
        );

        Ok(Self { path, state })
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &MemoryStore) -> Result<(), StoreError> {
        let envelope = Envelope {
            version: SNAPSHOT_VERSION,
            checksum: checksum(state)?,
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn bank(&self, asset: &AssetId) -> Result<Option<Bank>, StoreError> {
        self.state.bank(asset)
    }

    fn position(&self, user: &UserId) -> Result<Option<UserPosition>, StoreError> {
        self.state.position(user)
    }

    fn banks(&self) -> Result<Vec<Bank>, StoreError> {
        self.state.banks()
    }

    fn positions(&self) -> Result<Vec<UserPosition>, StoreError> {
        self.state.positions()
    }

    fn commit(&mut self, batch: StateBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        // Only swap in the new image once it is on disk
        let mut next = self.state.clone();
        next.apply(batch);
        self.persist(&next)?;
        self.state = next;

        tracing::debug!(path = %self.path.display(), "Persisted state snapshot");
        Ok(())
    }
}

fn checksum(state: &MemoryStore) -> Result<String, StoreError> {
    let canonical = serde_json::to_vec(state)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

fn load(path: &Path) -> Result<MemoryStore, StoreError> {
    let content = fs::read_to_string(path)?;
    let envelope: Envelope = serde_json::from_str(&content)?;

    if envelope.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: envelope.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let actual = checksum(&envelope.state)?;
    if actual != envelope.checksum {
        return Err(StoreError::Corrupted {
            path: path.to_path_buf(),
            expected: envelope.checksum,
            actual,
        });
    }

    Ok(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbank_ledger::{InterestRateParams, LiquidationParams};
    use tempfile::TempDir;

    fn sol_bank() -> Bank {
        Bank::new(
            AssetId::sol(),
            9,
            InterestRateParams::default(),
            LiquidationParams::default(),
            1_700_000_000,
        )
        .unwrap()
    }

    #[test]
    fn test_open_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path()).unwrap();
        assert!(store.banks().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let bob = UserId::new("bob").unwrap();

        let mut bank = sol_bank();
        bank.deposit(5_000_000_000).unwrap();
        let mut position = UserPosition::new(bob.clone(), 1_700_000_000);
        position.credit_deposit(&AssetId::sol(), 5_000_000_000).unwrap();

        {
            let mut store = JsonFileStore::open(temp_dir.path()).unwrap();
            store
                .commit(
                    StateBatch::new()
                        .with_bank(bank.clone())
                        .with_position(position.clone()),
                )
                .unwrap();
        }

        let store = JsonFileStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.bank(&AssetId::sol()).unwrap(), Some(bank));
        assert_eq!(store.position(&bob).unwrap(), Some(position));
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut store = JsonFileStore::open(temp_dir.path()).unwrap();
            let mut bank = sol_bank();
            bank.deposit(1_000).unwrap();
            store.commit(StateBatch::new().with_bank(bank)).unwrap();
        }

        let path = temp_dir.path().join(SNAPSHOT_FILE);
        let content = fs::read_to_string(&path).unwrap();
        let tampered = content.replace("\"idle_liquidity\": 1000", "\"idle_liquidity\": 9000");
        assert_ne!(content, tampered);
        fs::write(&path, tampered).unwrap();

        let result = JsonFileStore::open(temp_dir.path());
        assert!(matches!(result, Err(StoreError::Corrupted { .. })));
    }

    #[test]
    fn test_empty_batch_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(temp_dir.path()).unwrap();
        store.commit(StateBatch::new()).unwrap();
        assert!(!store.path().exists());
    }
}
