//! LendBank Core - Domain types
//!
//! This crate contains the fundamental types shared by every LendBank crate:
//! - `AssetId`: Validated asset code identifying a bank
//! - `UserId`: Validated user identity owning a position
//! - `Ratio`: Parts-per-billion fixed-point ratio used for rates and risk parameters
//! - `math`: Widening multiply/divide helpers with explicit rounding direction

pub mod asset;
pub mod math;
pub mod ratio;
pub mod user;

pub use asset::{AssetId, IdError};
pub use math::{mul_div_ceil, mul_div_floor, MathError};
pub use ratio::{Ratio, RATE_SCALE, SECONDS_PER_YEAR};
pub use user::UserId;
