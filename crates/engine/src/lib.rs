//! LendBank Engine - Lending operations orchestrator
//!
//! `LendingEngine` is the only writer of bank and position state. Every
//! operation runs on scratch copies: accrue, update shares, check health,
//! move the asset, and only then commit the new state in one batch.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod receipt;
pub mod transfer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::LendingEngine;
pub use error::LendingError;
pub use health::HealthReport;
pub use receipt::{OperationKind, OperationReceipt, UserBalances};
pub use transfer::{AssetTransfer, Endpoint, RecordingTransfer, TransferError, TransferIntent, TransferReceipt};
