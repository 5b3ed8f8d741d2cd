//! Ratio - Parts-per-billion fixed-point ratio
//!
//! Interest rates, utilization, and risk parameters are all expressed as a
//! `Ratio`. Floating point never enters the ledger; every operation on a
//! ratio truncates toward zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::{mul_div_floor, MathError};

/// Fixed-point scale: 1.0 == 1_000_000_000 (parts per billion)
pub const RATE_SCALE: u64 = 1_000_000_000;

/// Seconds in the 365-day year used to de-annualize rates
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// A non-negative ratio with 9 decimal places of precision
///
/// # Example
/// ```
/// use lendbank_core::Ratio;
///
/// let threshold = Ratio::from_bps(8_000); // 80%
/// assert_eq!(threshold.apply_floor(1_000).unwrap(), 800);
/// assert!(threshold < Ratio::ONE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(u64);

impl Ratio {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(RATE_SCALE);

    /// Construct from raw parts-per-billion
    pub const fn from_ppb(ppb: u64) -> Self {
        Self(ppb)
    }

    /// Construct from basis points (1 bps = 0.01%)
    pub const fn from_bps(bps: u64) -> Self {
        Self(bps * (RATE_SCALE / 10_000))
    }

    /// Construct from whole percent
    pub const fn from_percent(percent: u64) -> Self {
        Self(percent * (RATE_SCALE / 100))
    }

    /// `numerator / denominator`, truncated, clamped to `ONE`.
    ///
    /// A zero denominator yields `ZERO` (an empty pool has no utilization).
    pub fn from_fraction_clamped(numerator: u128, denominator: u128) -> Result<Self, MathError> {
        if denominator == 0 {
            return Ok(Self::ZERO);
        }
        let ppb = mul_div_floor(numerator, RATE_SCALE as u128, denominator)?;
        Ok(Self(ppb.min(RATE_SCALE as u128) as u64))
    }

    pub const fn ppb(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `floor(value * self)`
    pub fn apply_floor(&self, value: u128) -> Result<u128, MathError> {
        mul_div_floor(value, self.0 as u128, RATE_SCALE as u128)
    }

    /// `floor(self * other)`
    pub fn mul(&self, other: Ratio) -> Result<Ratio, MathError> {
        let ppb = mul_div_floor(self.0 as u128, other.0 as u128, RATE_SCALE as u128)?;
        u64::try_from(ppb).map(Ratio).map_err(|_| MathError::Overflow)
    }

    pub fn checked_add(&self, other: Ratio) -> Result<Ratio, MathError> {
        self.0.checked_add(other.0).map(Ratio).ok_or(MathError::Overflow)
    }

    pub fn saturating_sub(&self, other: Ratio) -> Ratio {
        Ratio(self.0.saturating_sub(other.0))
    }

    /// Exact decimal representation (e.g. 0.8 for 80%)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.0 as i128, 9).normalize()
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_agree() {
        assert_eq!(Ratio::from_bps(5_000), Ratio::from_percent(50));
        assert_eq!(Ratio::from_ppb(500_000_000), Ratio::from_percent(50));
        assert_eq!(Ratio::from_percent(100), Ratio::ONE);
    }

    #[test]
    fn test_fraction_clamped() {
        assert_eq!(Ratio::from_fraction_clamped(1, 4).unwrap(), Ratio::from_percent(25));
        assert_eq!(Ratio::from_fraction_clamped(5, 4).unwrap(), Ratio::ONE);
        assert_eq!(Ratio::from_fraction_clamped(5, 0).unwrap(), Ratio::ZERO);
    }

    #[test]
    fn test_fraction_truncates() {
        // 1/3 = 0.333333333...
        assert_eq!(Ratio::from_fraction_clamped(1, 3).unwrap().ppb(), 333_333_333);
    }

    #[test]
    fn test_mul_truncates() {
        let third = Ratio::from_fraction_clamped(1, 3).unwrap();
        assert_eq!(third.mul(Ratio::from_percent(50)).unwrap().ppb(), 166_666_666);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Ratio::from_percent(80).to_decimal(), Decimal::new(8, 1));
        assert_eq!(Ratio::ONE.to_string(), "1");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Ratio::from_bps(1)).unwrap();
        assert_eq!(json, "100000");
    }
}
