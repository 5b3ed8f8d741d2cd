//! Widening fixed-point helpers
//!
//! Every share/amount conversion in the ledger goes through one of these two
//! functions so the rounding direction is always explicit at the call site.

use thiserror::Error;

/// Arithmetic failures on ledger quantities
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,
}

/// `floor(a * b / d)`
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Result<u128, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    Ok(product / d)
}

/// `ceil(a * b / d)`
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> Result<u128, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let quotient = product / d;
    if product % d == 0 {
        Ok(quotient)
    } else {
        quotient.checked_add(1).ok_or(MathError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_truncates() {
        assert_eq!(mul_div_floor(10, 2, 3).unwrap(), 6);
        assert_eq!(mul_div_floor(9, 2, 3).unwrap(), 6);
    }

    #[test]
    fn test_ceil_rounds_up_only_on_remainder() {
        assert_eq!(mul_div_ceil(10, 2, 3).unwrap(), 7);
        assert_eq!(mul_div_ceil(9, 2, 3).unwrap(), 6);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(MathError::DivisionByZero));
        assert_eq!(mul_div_ceil(1, 1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_overflow_detected() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), Err(MathError::Overflow));
    }
}
