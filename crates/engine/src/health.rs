//! Health evaluation
//!
//! A position is healthy while
//!
//! ```text
//! borrow_value <= collateral_value * liquidation_threshold
//! ```
//!
//! where both values are USD totals of the underlying amounts (redeemable for
//! deposits, owed for debt) at validated oracle prices. The threshold is that
//! of the borrowed asset's bank.

use lendbank_core::{AssetId, MathError, Ratio, UserId};
use lendbank_ledger::{Bank, UserPosition};
use lendbank_oracle::OracleError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LendingError;

/// Valuation of one user's position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub user: UserId,
    /// USD value of everything the user can redeem
    pub collateral_value: Decimal,
    /// USD value of everything the user owes
    pub borrow_value: Decimal,
    /// Threshold of the borrowed asset's bank; `None` without debt
    pub liquidation_threshold: Option<Ratio>,
    /// `collateral_value * liquidation_threshold`
    pub borrow_limit: Decimal,
    /// `collateral_value * max_ltv` of the borrowed asset's bank
    ///
    /// Reported only. Operations are gated by `borrow_limit` alone.
    pub max_borrow_value: Decimal,
    /// `borrow_limit / borrow_value`; `None` without debt
    pub health_factor: Option<Decimal>,
    pub debt_asset: Option<AssetId>,
    pub debt_owed: u64,
    /// Portion of the debt a liquidator could close in one call
    pub max_closeable_debt: u64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.borrow_value <= self.borrow_limit
    }

    pub fn is_liquidatable(&self) -> bool {
        !self.is_healthy()
    }
}

/// USD value of `amount` base units of an asset with `decimals` decimals
pub fn value_of(amount: u64, decimals: u8, price: Decimal) -> Result<Decimal, MathError> {
    Decimal::from_i128_with_scale(amount as i128, decimals as u32)
        .checked_mul(price)
        .ok_or(MathError::Overflow)
}

/// Value `position` against accrued `banks` and validated `prices`
///
/// Both maps must cover every asset the position holds shares in.
pub fn evaluate(
    position: &UserPosition,
    banks: &BTreeMap<AssetId, Bank>,
    prices: &BTreeMap<AssetId, Decimal>,
) -> Result<HealthReport, LendingError> {
    let mut collateral_value = Decimal::ZERO;
    for (asset, shares) in &position.deposit_shares {
        let (bank, price) = lookup(banks, prices, asset)?;
        let amount = bank.redeemable(*shares)?;
        collateral_value = collateral_value
            .checked_add(value_of(amount, bank.decimals, price)?)
            .ok_or(MathError::Overflow)?;
    }

    let mut borrow_value = Decimal::ZERO;
    let mut liquidation_threshold: Option<Ratio> = None;
    let mut max_ltv: Option<Ratio> = None;
    let mut debt_asset = None;
    let mut debt_owed = 0u64;
    let mut max_closeable_debt = 0u64;
    for (asset, shares) in &position.borrow_shares {
        let (bank, price) = lookup(banks, prices, asset)?;
        let owed = bank.owed(*shares)?;
        borrow_value = borrow_value
            .checked_add(value_of(owed, bank.decimals, price)?)
            .ok_or(MathError::Overflow)?;

        // Strictest bank wins if more than one asset is ever borrowed
        let params = &bank.liquidation;
        liquidation_threshold = Some(match liquidation_threshold {
            Some(current) => current.min(params.liquidation_threshold),
            None => params.liquidation_threshold,
        });
        max_ltv = Some(match max_ltv {
            Some(current) => current.min(params.max_ltv),
            None => params.max_ltv,
        });

        debt_asset = Some(asset.clone());
        debt_owed = owed;
        let closeable = params.liquidation_close_factor.apply_floor(owed as u128)?;
        max_closeable_debt = u64::try_from(closeable).map_err(|_| MathError::Overflow)?;
    }

    let scale = |ratio: Option<Ratio>| -> Result<Decimal, MathError> {
        match ratio {
            Some(ratio) => collateral_value
                .checked_mul(ratio.to_decimal())
                .ok_or(MathError::Overflow),
            None => Ok(collateral_value),
        }
    };
    let borrow_limit = scale(liquidation_threshold)?;
    let max_borrow_value = scale(max_ltv)?;

    let health_factor = if borrow_value.is_zero() {
        None
    } else {
        Some(
            borrow_limit
                .checked_div(borrow_value)
                .ok_or(MathError::DivisionByZero)?,
        )
    };

    Ok(HealthReport {
        user: position.user.clone(),
        collateral_value,
        borrow_value,
        liquidation_threshold,
        borrow_limit,
        max_borrow_value,
        health_factor,
        debt_asset,
        debt_owed,
        max_closeable_debt,
    })
}

fn lookup<'a>(
    banks: &'a BTreeMap<AssetId, Bank>,
    prices: &BTreeMap<AssetId, Decimal>,
    asset: &AssetId,
) -> Result<(&'a Bank, Decimal), LendingError> {
    let bank = banks
        .get(asset)
        .ok_or_else(|| LendingError::BankNotFound(asset.clone()))?;
    let price = prices
        .get(asset)
        .copied()
        .ok_or_else(|| LendingError::StaleOracleData {
            asset: asset.clone(),
            source: OracleError::PriceNotFound {
                asset: asset.clone(),
            },
        })?;
    Ok((bank, price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbank_ledger::{InterestRateParams, LiquidationParams};
    use rust_decimal_macros::dec;

    fn bank(asset: AssetId, decimals: u8) -> Bank {
        Bank::new(
            asset,
            decimals,
            InterestRateParams::default(),
            LiquidationParams::default(),
            0,
        )
        .unwrap()
    }

    /// 100 USDC of collateral, 0.5 SOL of debt
    fn setup() -> (UserPosition, BTreeMap<AssetId, Bank>) {
        let mut position = UserPosition::new(UserId::new("alice").unwrap(), 0);

        let mut usdc = bank(AssetId::usdc(), 6);
        let shares = usdc.deposit(100_000_000).unwrap();
        position.credit_deposit(&AssetId::usdc(), shares).unwrap();

        let mut sol = bank(AssetId::sol(), 9);
        sol.deposit(10_000_000_000).unwrap();
        let debt = sol.borrow(500_000_000).unwrap();
        position.credit_borrow(&AssetId::sol(), debt).unwrap();

        let banks = BTreeMap::from([(AssetId::usdc(), usdc), (AssetId::sol(), sol)]);
        (position, banks)
    }

    fn prices(sol: Decimal) -> BTreeMap<AssetId, Decimal> {
        BTreeMap::from([(AssetId::usdc(), dec!(1)), (AssetId::sol(), sol)])
    }

    #[test]
    fn test_value_of_scales_by_decimals() {
        assert_eq!(value_of(1_500_000, 6, dec!(2)).unwrap(), dec!(3));
        assert_eq!(value_of(0, 9, dec!(150)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_healthy_position() {
        let (position, banks) = setup();
        let report = evaluate(&position, &banks, &prices(dec!(100))).unwrap();

        assert_eq!(report.collateral_value, dec!(100));
        assert_eq!(report.borrow_value, dec!(50));
        assert_eq!(report.liquidation_threshold, Some(Ratio::from_percent(80)));
        assert_eq!(report.borrow_limit, dec!(80));
        assert_eq!(report.max_borrow_value, dec!(75));
        assert_eq!(report.health_factor, Some(dec!(1.6)));
        assert_eq!(report.debt_asset, Some(AssetId::sol()));
        assert_eq!(report.debt_owed, 500_000_000);
        assert_eq!(report.max_closeable_debt, 250_000_000);
        assert!(report.is_healthy());
    }

    #[test]
    fn test_price_move_makes_position_liquidatable() {
        let (position, banks) = setup();
        let report = evaluate(&position, &banks, &prices(dec!(200))).unwrap();

        assert_eq!(report.borrow_value, dec!(100));
        assert!(report.is_liquidatable());
        assert!(report.health_factor.unwrap() < Decimal::ONE);
    }

    #[test]
    fn test_boundary_is_healthy() {
        let (position, banks) = setup();
        // 0.5 SOL * 160 = 80 = limit
        let report = evaluate(&position, &banks, &prices(dec!(160))).unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.health_factor, Some(Decimal::ONE));
    }

    #[test]
    fn test_no_debt() {
        let (mut position, banks) = setup();
        position.borrow_shares.clear();

        let report = evaluate(&position, &banks, &prices(dec!(100))).unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.liquidation_threshold, None);
        assert_eq!(report.health_factor, None);
        assert_eq!(report.debt_owed, 0);
    }

    #[test]
    fn test_missing_price() {
        let (position, banks) = setup();
        let mut partial = prices(dec!(100));
        partial.remove(&AssetId::sol());

        let result = evaluate(&position, &banks, &partial);
        assert!(matches!(result, Err(LendingError::StaleOracleData { .. })));
    }
}
