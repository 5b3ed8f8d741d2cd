//! LendBank Price Oracle
//!
//! The core never publishes prices; it only consumes them. This crate defines
//! the read-only `PriceOracle` seam, the `OracleGuard` that rejects stale or
//! low-confidence quotes, and a `MockOracle` for tests.

mod error;
mod guard;
mod mock;
mod types;

pub use error::OracleError;
pub use guard::{OracleConfig, OracleGuard};
pub use mock::MockOracle;
pub use types::{PriceOracle, PriceQuote};
