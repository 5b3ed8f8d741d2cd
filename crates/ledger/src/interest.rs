//! Interest Rate Model
//!
//! Maps a bank's utilization to an annualized borrow rate. Depositors earn the
//! borrow rate scaled by utilization, i.e. only the interest borrowers pay.

use lendbank_core::{MathError, Ratio};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Utilization -> rate mapping
///
/// Implementations must be pure and monotonically non-decreasing in
/// utilization.
pub trait InterestRateModel {
    /// Annualized borrow rate at `utilization`
    fn borrow_rate(&self, utilization: Ratio) -> Result<Ratio, MathError>;

    /// Annualized deposit rate at `utilization`
    fn deposit_rate(&self, utilization: Ratio) -> Result<Ratio, MathError> {
        self.borrow_rate(utilization)?.mul(utilization)
    }
}

/// Piecewise-linear "kink" model
///
/// ```text
/// u <= kink : base + u * slope1
/// u >  kink : base + kink * slope1 + (u - kink) * slope2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateParams {
    pub base_rate: Ratio,
    pub slope1: Ratio,
    pub kink: Ratio,
    pub slope2: Ratio,
}

impl InterestRateParams {
    /// Flat rate regardless of utilization
    pub fn flat(rate: Ratio) -> Self {
        Self {
            base_rate: rate,
            slope1: Ratio::ZERO,
            kink: Ratio::ONE,
            slope2: Ratio::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.kink > Ratio::ONE {
            return Err(LedgerError::InvalidRateParams("kink must not exceed 1"));
        }
        // Worst case rate must be representable
        self.borrow_rate(Ratio::ONE)?;
        Ok(())
    }
}

impl Default for InterestRateParams {
    /// 2% base, 10% up to 80% utilization, 100% beyond
    fn default() -> Self {
        Self {
            base_rate: Ratio::from_percent(2),
            slope1: Ratio::from_percent(10),
            kink: Ratio::from_percent(80),
            slope2: Ratio::from_percent(100),
        }
    }
}

impl InterestRateModel for InterestRateParams {
    fn borrow_rate(&self, utilization: Ratio) -> Result<Ratio, MathError> {
        let utilization = utilization.min(Ratio::ONE);

        if utilization <= self.kink {
            return self.base_rate.checked_add(utilization.mul(self.slope1)?);
        }

        let at_kink = self.base_rate.checked_add(self.kink.mul(self.slope1)?)?;
        let excess = utilization.saturating_sub(self.kink);
        at_kink.checked_add(excess.mul(self.slope2)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_at_zero_utilization_is_base() {
        let model = InterestRateParams::default();
        assert_eq!(model.borrow_rate(Ratio::ZERO).unwrap(), Ratio::from_percent(2));
        assert_eq!(model.deposit_rate(Ratio::ZERO).unwrap(), Ratio::ZERO);
    }

    #[test]
    fn test_rate_below_kink() {
        let model = InterestRateParams::default();
        // 2% + 50% * 10% = 7%
        assert_eq!(model.borrow_rate(Ratio::from_percent(50)).unwrap(), Ratio::from_percent(7));
    }

    #[test]
    fn test_rate_above_kink() {
        let model = InterestRateParams::default();
        // 2% + 80% * 10% + 10% * 100% = 20%
        assert_eq!(model.borrow_rate(Ratio::from_percent(90)).unwrap(), Ratio::from_percent(20));
    }

    #[test]
    fn test_deposit_rate_scaled_by_utilization() {
        let model = InterestRateParams::default();
        // 7% * 50% = 3.5%
        assert_eq!(
            model.deposit_rate(Ratio::from_percent(50)).unwrap(),
            Ratio::from_bps(350)
        );
    }

    #[test]
    fn test_monotonic_in_utilization() {
        let model = InterestRateParams::default();
        let mut previous = Ratio::ZERO;
        for bps in (0..=10_000).step_by(25) {
            let rate = model.borrow_rate(Ratio::from_bps(bps)).unwrap();
            assert!(rate >= previous, "rate decreased at {} bps", bps);
            previous = rate;
        }
    }

    #[test]
    fn test_flat_model() {
        let model = InterestRateParams::flat(Ratio::from_percent(5));
        assert_eq!(model.borrow_rate(Ratio::ONE).unwrap(), Ratio::from_percent(5));
    }

    #[test]
    fn test_invalid_kink() {
        let params = InterestRateParams {
            kink: Ratio::from_percent(120),
            ..InterestRateParams::default()
        };
        assert!(matches!(params.validate(), Err(LedgerError::InvalidRateParams(_))));
    }
}
