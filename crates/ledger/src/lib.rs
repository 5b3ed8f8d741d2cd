//! LendBank Ledger - Share accounting core
//!
//! All balance arithmetic of the protocol lives in this crate.
//!
//! # Key Types
//! - `Bank`: Per-asset pool with deposit/borrow share totals and lazy accrual
//! - `UserPosition`: Per-user share balances across banks
//! - `InterestRateModel`: Utilization -> rate mapping (`InterestRateParams` kink model)
//! - `LiquidationParams`: Risk parameters bounding safe loan-to-value

pub mod bank;
pub mod error;
pub mod interest;
pub mod position;

pub use bank::{Bank, LiquidationParams, MAX_DECIMALS};
pub use error::LedgerError;
pub use interest::{InterestRateModel, InterestRateParams};
pub use position::UserPosition;
