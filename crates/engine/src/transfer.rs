//! Asset transfer seam
//!
//! The engine never moves tokens itself. It describes each movement as a
//! `TransferIntent` and hands it to an `AssetTransfer`; state is committed
//! only if the transfer succeeds.

use chrono::{DateTime, Utc};
use lendbank_core::{AssetId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// One side of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    /// A user's external wallet
    User(UserId),
    /// The pool's vault for one asset
    Vault(AssetId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::User(user) => write!(f, "user:{}", user),
            Endpoint::Vault(asset) => write!(f, "vault:{}", asset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub id: Uuid,
    pub asset: AssetId,
    pub amount: u64,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl TransferIntent {
    pub fn new(asset: AssetId, amount: u64, from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset,
            amount,
            from,
            to,
        }
    }
}

/// Proof that a transfer completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub intent_id: Uuid,
    /// Executor-specific reference (tx signature, journal id, ...)
    pub reference: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Transfer {intent_id} rejected: {reason}")]
    Rejected { intent_id: Uuid, reason: String },

    #[error("Transfer executor unavailable: {0}")]
    Unavailable(String),
}

/// Executes token movements between users and vaults
pub trait AssetTransfer {
    fn transfer(&mut self, intent: &TransferIntent) -> Result<TransferReceipt, TransferError>;
}

/// In-process executor that records every completed transfer
///
/// Tracks vault balances per asset and refuses to overdraw a vault, so it can
/// be used to cross-check pool accounting against actual token movements.
#[derive(Debug, Default)]
pub struct RecordingTransfer {
    history: Vec<TransferIntent>,
    vaults: BTreeMap<AssetId, u64>,
    fail_next: Option<String>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed transfers in order
    pub fn history(&self) -> &[TransferIntent] {
        &self.history
    }

    /// Tokens currently held by the vault of `asset`
    pub fn vault_balance(&self, asset: &AssetId) -> u64 {
        self.vaults.get(asset).copied().unwrap_or(0)
    }

    /// Make the next transfer fail with `reason`
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }
}

impl AssetTransfer for RecordingTransfer {
    fn transfer(&mut self, intent: &TransferIntent) -> Result<TransferReceipt, TransferError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(TransferError::Rejected {
                intent_id: intent.id,
                reason,
            });
        }

        let mut vaults = self.vaults.clone();
        if let Endpoint::Vault(asset) = &intent.from {
            let held = vaults.get(asset).copied().unwrap_or(0);
            let remaining = held.checked_sub(intent.amount).ok_or_else(|| TransferError::Rejected {
                intent_id: intent.id,
                reason: format!("vault {} holds {}, cannot send {}", asset, held, intent.amount),
            })?;
            vaults.insert(asset.clone(), remaining);
        }
        if let Endpoint::Vault(asset) = &intent.to {
            let held = vaults.get(asset).copied().unwrap_or(0);
            let updated = held.checked_add(intent.amount).ok_or_else(|| TransferError::Rejected {
                intent_id: intent.id,
                reason: format!("vault {} balance overflow", asset),
            })?;
            vaults.insert(asset.clone(), updated);
        }

        self.vaults = vaults;
        self.history.push(intent.clone());

        Ok(TransferReceipt {
            intent_id: intent.id,
            reference: format!("rec-{}", self.history.len()),
            completed_at: Utc::now(),
        })
    }
}
