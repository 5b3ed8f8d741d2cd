//! Bank - Per-asset liquidity pool
//!
//! Deposits and borrows are tracked as shares against two pool totals. Interest
//! is applied lazily to `total_borrowed`; because the deposited total is
//! defined as `total_borrowed + idle_liquidity`, the same accrual raises every
//! depositor's exchange rate without touching any position.
//!
//! Rounding on every conversion favors the pool:
//! - deposit mints `floor` shares
//! - withdraw burns `ceil` shares
//! - borrow mints `ceil` debt shares
//! - repay burns `floor` debt shares

use lendbank_core::{mul_div_ceil, mul_div_floor, AssetId, MathError, Ratio, RATE_SCALE, SECONDS_PER_YEAR};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::interest::{InterestRateModel, InterestRateParams};

/// Largest supported number of decimal places for an asset
pub const MAX_DECIMALS: u8 = 18;

const ACCRUAL_SCALE: u128 = RATE_SCALE as u128 * SECONDS_PER_YEAR as u128;

/// Risk parameters of a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationParams {
    /// Borrow value may not exceed collateral value times this ratio (< 1)
    pub liquidation_threshold: Ratio,
    /// Extra collateral share paid to a liquidator
    pub liquidation_bonus: Ratio,
    /// Maximum fraction of debt closable in one liquidation
    pub liquidation_close_factor: Ratio,
    /// Advisory loan-to-value limit (<= liquidation threshold); reported in
    /// health reports, never enforced
    pub max_ltv: Ratio,
}

impl LiquidationParams {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.liquidation_threshold.is_zero() || self.liquidation_threshold >= Ratio::ONE {
            return Err(LedgerError::InvalidLiquidationParams(
                "liquidation threshold must be in (0, 1)",
            ));
        }
        if self.max_ltv > self.liquidation_threshold {
            return Err(LedgerError::InvalidLiquidationParams(
                "max LTV must not exceed the liquidation threshold",
            ));
        }
        if self.liquidation_close_factor > Ratio::ONE {
            return Err(LedgerError::InvalidLiquidationParams(
                "close factor must not exceed 1",
            ));
        }
        if self.liquidation_bonus > Ratio::ONE {
            return Err(LedgerError::InvalidLiquidationParams(
                "liquidation bonus must not exceed 1",
            ));
        }
        Ok(())
    }
}

impl Default for LiquidationParams {
    fn default() -> Self {
        Self {
            liquidation_threshold: Ratio::from_percent(80),
            liquidation_bonus: Ratio::from_percent(5),
            liquidation_close_factor: Ratio::from_percent(50),
            max_ltv: Ratio::from_percent(75),
        }
    }
}

/// Per-asset pool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub asset: AssetId,
    /// Decimal places of the asset's smallest unit
    pub decimals: u8,
    /// Cash held by the pool vault
    pub idle_liquidity: u64,
    /// Outstanding debt including accrued interest
    pub total_borrowed: u64,
    pub total_deposit_shares: u128,
    pub total_borrow_shares: u128,
    pub rate_params: InterestRateParams,
    pub liquidation: LiquidationParams,
    /// Unix seconds of the last accrual
    pub last_accrual_ts: i64,
    /// Sub-unit interest carried between accruals, scaled by
    /// `RATE_SCALE * SECONDS_PER_YEAR`
    #[serde(default)]
    pub interest_remainder: u128,
}

impl Bank {
    /// Create an empty bank, validating its parameters
    pub fn new(
        asset: AssetId,
        decimals: u8,
        rate_params: InterestRateParams,
        liquidation: LiquidationParams,
        now: i64,
    ) -> Result<Self, LedgerError> {
        if decimals > MAX_DECIMALS {
            return Err(LedgerError::InvalidDecimals {
                found: decimals,
                max: MAX_DECIMALS,
            });
        }
        rate_params.validate()?;
        liquidation.validate()?;

        Ok(Self {
            asset,
            decimals,
            idle_liquidity: 0,
            total_borrowed: 0,
            total_deposit_shares: 0,
            total_borrow_shares: 0,
            rate_params,
            liquidation,
            last_accrual_ts: now,
            interest_remainder: 0,
        })
    }

    /// Everything depositors have a claim on: outstanding debt plus idle cash
    pub fn total_deposited(&self) -> Result<u64, MathError> {
        self.total_borrowed
            .checked_add(self.idle_liquidity)
            .ok_or(MathError::Overflow)
    }

    /// `total_borrowed / total_deposited`, zero for an empty pool
    pub fn utilization(&self) -> Result<Ratio, MathError> {
        Ratio::from_fraction_clamped(self.total_borrowed as u128, self.total_deposited()? as u128)
    }

    pub fn borrow_rate(&self) -> Result<Ratio, MathError> {
        self.rate_params.borrow_rate(self.utilization()?)
    }

    pub fn deposit_rate(&self) -> Result<Ratio, MathError> {
        self.rate_params.deposit_rate(self.utilization()?)
    }

    /// Advance interest to `now`. Returns the interest added to `total_borrowed`.
    ///
    /// A repeated or earlier timestamp is a no-op.
    pub fn accrue(&mut self, now: i64) -> Result<u64, LedgerError> {
        if now <= self.last_accrual_ts {
            return Ok(0);
        }
        let elapsed = (now - self.last_accrual_ts) as u128;
        let rate = self.borrow_rate()?;

        // Whole units go to total_borrowed; the fraction is carried so that
        // frequent accrual charges the same as one long step
        let accrued = (self.total_borrowed as u128)
            .checked_mul(
                (rate.ppb() as u128)
                    .checked_mul(elapsed)
                    .ok_or(MathError::Overflow)?,
            )
            .and_then(|scaled| scaled.checked_add(self.interest_remainder))
            .ok_or(MathError::Overflow)?;
        let interest = accrued / ACCRUAL_SCALE;
        let remainder = accrued % ACCRUAL_SCALE;
        let interest = to_u64(interest)?;

        let total_borrowed = self
            .total_borrowed
            .checked_add(interest)
            .ok_or(MathError::Overflow)?;
        // total_deposited() must stay representable
        total_borrowed
            .checked_add(self.idle_liquidity)
            .ok_or(MathError::Overflow)?;

        self.total_borrowed = total_borrowed;
        self.interest_remainder = remainder;
        self.last_accrual_ts = now;

        if interest > 0 {
            tracing::debug!(
                asset = %self.asset,
                elapsed = elapsed as u64,
                borrow_rate = %rate,
                interest,
                total_borrowed = self.total_borrowed,
                "Accrued interest"
            );
        }

        Ok(interest)
    }

    /// Underlying amount `shares` of deposit can redeem (rounded down)
    pub fn redeemable(&self, shares: u128) -> Result<u64, LedgerError> {
        if shares == 0 || self.total_deposit_shares == 0 {
            return Ok(0);
        }
        let amount = mul_div_floor(
            shares,
            self.total_deposited()? as u128,
            self.total_deposit_shares,
        )?;
        Ok(to_u64(amount)?)
    }

    /// Underlying amount owed for `shares` of debt (rounded up)
    pub fn owed(&self, shares: u128) -> Result<u64, LedgerError> {
        if shares == 0 || self.total_borrow_shares == 0 {
            return Ok(0);
        }
        let amount = mul_div_ceil(shares, self.total_borrowed as u128, self.total_borrow_shares)?;
        Ok(to_u64(amount)?)
    }

    /// Add `amount` of liquidity. Returns the deposit shares minted.
    pub fn deposit(&mut self, amount: u64) -> Result<u128, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let shares = if self.total_deposit_shares == 0 {
            amount as u128
        } else {
            mul_div_floor(
                amount as u128,
                self.total_deposit_shares,
                self.total_deposited()? as u128,
            )?
        };
        if shares == 0 {
            return Err(LedgerError::DustAmount {
                asset: self.asset.clone(),
                amount,
                reason: "deposit is worth less than one share",
            });
        }

        let idle_liquidity = self
            .idle_liquidity
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        self.total_borrowed
            .checked_add(idle_liquidity)
            .ok_or(MathError::Overflow)?;
        let total_deposit_shares = self
            .total_deposit_shares
            .checked_add(shares)
            .ok_or(MathError::Overflow)?;

        self.idle_liquidity = idle_liquidity;
        self.total_deposit_shares = total_deposit_shares;
        Ok(shares)
    }

    /// Remove `amount` of liquidity owned by a holder of `holder_shares`.
    /// Returns the deposit shares burned.
    pub fn withdraw(&mut self, amount: u64, holder_shares: u128) -> Result<u128, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let redeemable = self.redeemable(holder_shares)?;
        if amount > redeemable {
            return Err(LedgerError::InsufficientBalance {
                asset: self.asset.clone(),
                available: redeemable,
                requested: amount,
            });
        }
        if amount > self.idle_liquidity {
            return Err(LedgerError::InsufficientLiquidity {
                asset: self.asset.clone(),
                available: self.idle_liquidity,
                requested: amount,
            });
        }

        let total_deposited = self.total_deposited()?;
        let burned = if amount == redeemable {
            holder_shares
        } else {
            mul_div_ceil(amount as u128, self.total_deposit_shares, total_deposited as u128)?
        };

        // Retiring every share must also retire every unit
        if burned == self.total_deposit_shares && amount < total_deposited {
            return Err(LedgerError::DustAmount {
                asset: self.asset.clone(),
                amount,
                reason: "withdrawal would strand an unowned remainder; withdraw the full balance",
            });
        }

        self.idle_liquidity -= amount;
        self.total_deposit_shares -= burned;
        Ok(burned)
    }

    /// Lend out `amount` of idle liquidity. Returns the debt shares minted.
    pub fn borrow(&mut self, amount: u64) -> Result<u128, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if amount > self.idle_liquidity {
            return Err(LedgerError::InsufficientLiquidity {
                asset: self.asset.clone(),
                available: self.idle_liquidity,
                requested: amount,
            });
        }

        let shares = if self.total_borrow_shares == 0 {
            amount as u128
        } else {
            mul_div_ceil(amount as u128, self.total_borrow_shares, self.total_borrowed as u128)?
        };

        let total_borrow_shares = self
            .total_borrow_shares
            .checked_add(shares)
            .ok_or(MathError::Overflow)?;

        self.idle_liquidity -= amount;
        self.total_borrowed += amount;
        self.total_borrow_shares = total_borrow_shares;
        Ok(shares)
    }

    /// Pay back `amount` of debt owed by a holder of `holder_shares`.
    /// Returns the debt shares burned.
    pub fn repay(&mut self, amount: u64, holder_shares: u128) -> Result<u128, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let owed = self.owed(holder_shares)?;
        if amount > owed {
            return Err(LedgerError::OverRepay {
                asset: self.asset.clone(),
                owed,
                requested: amount,
            });
        }

        let burned = if amount == owed {
            holder_shares
        } else {
            mul_div_floor(amount as u128, self.total_borrow_shares, self.total_borrowed as u128)?
        };
        if burned == 0 {
            return Err(LedgerError::DustAmount {
                asset: self.asset.clone(),
                amount,
                reason: "repayment is worth less than one debt share",
            });
        }

        // Debt retired is the floor value of the burned shares; any excess cash
        // stays in the pool for depositors.
        let retired = if burned == self.total_borrow_shares {
            self.total_borrowed
        } else {
            to_u64(mul_div_floor(
                burned,
                self.total_borrowed as u128,
                self.total_borrow_shares,
            )?)?
        };

        let idle_liquidity = self
            .idle_liquidity
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        let total_borrowed = self.total_borrowed - retired;
        total_borrowed
            .checked_add(idle_liquidity)
            .ok_or(MathError::Overflow)?;

        self.idle_liquidity = idle_liquidity;
        self.total_borrowed = total_borrowed;
        self.total_borrow_shares -= burned;
        if self.total_borrow_shares == 0 {
            // Nothing left to carry a fraction for
            self.interest_remainder = 0;
        }
        Ok(burned)
    }
}

fn to_u64(value: u128) -> Result<u64, MathError> {
    u64::try_from(value).map_err(|_| MathError::Overflow)
}
