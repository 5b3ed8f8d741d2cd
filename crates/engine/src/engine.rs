//! LendingEngine - the single writer of bank and position state
//!
//! Flow of every state-changing operation:
//!
//! 1. Load the bank and position into scratch copies
//! 2. Accrue the bank to `now`
//! 3. Apply the share arithmetic (all checks happen here)
//! 4. Health gate (withdraw, borrow)
//! 5. Execute the asset transfer
//! 6. Commit bank + position in one batch
//!
//! Any failure before step 6 drops the scratch copies, so stored state is
//! untouched.

use chrono::{DateTime, Utc};
use lendbank_core::{AssetId, UserId};
use lendbank_ledger::{Bank, InterestRateParams, LiquidationParams, UserPosition};
use lendbank_oracle::{OracleGuard, PriceOracle};
use lendbank_store::{StateBatch, StateStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::LendingError;
use crate::health::{self, HealthReport};
use crate::receipt::{OperationKind, OperationReceipt, UserBalances};
use crate::transfer::{AssetTransfer, Endpoint, TransferIntent};

/// Lending engine over a state store and a transfer executor
///
/// Operations take `&mut self`; wrap the engine in a `Mutex` to share it.
pub struct LendingEngine<S, T> {
    store: S,
    transfer: T,
    oracle: Arc<dyn PriceOracle>,
    clock: Arc<dyn Clock>,
    guard: OracleGuard,
}

/// Scratch state of one operation, committed only after the transfer succeeds
struct Staged {
    kind: OperationKind,
    user: UserId,
    asset: AssetId,
    amount: u64,
    shares: u128,
    bank: Bank,
    position: UserPosition,
    intent: TransferIntent,
    now: i64,
}

impl<S: StateStore, T: AssetTransfer> LendingEngine<S, T> {
    pub fn new(
        store: S,
        transfer: T,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            transfer,
            oracle,
            clock,
            guard: OracleGuard::new(config.oracle),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    // === Administration ===

    /// Create the bank for `asset`
    pub fn init_bank(
        &mut self,
        asset: AssetId,
        decimals: u8,
        rate_params: InterestRateParams,
        liquidation: LiquidationParams,
    ) -> Result<Bank, LendingError> {
        if self.store.bank(&asset)?.is_some() {
            return Err(LendingError::BankAlreadyExists(asset));
        }

        let bank = Bank::new(asset, decimals, rate_params, liquidation, self.clock.now())?;
        self.store.commit(StateBatch::new().with_bank(bank.clone()))?;

        tracing::info!(
            asset = %bank.asset,
            decimals,
            liquidation_threshold = %bank.liquidation.liquidation_threshold,
            "Bank initialized"
        );
        Ok(bank)
    }

    /// Open an empty position for `user`
    pub fn init_user(&mut self, user: UserId) -> Result<UserPosition, LendingError> {
        if self.store.position(&user)?.is_some() {
            return Err(LendingError::UserAlreadyExists(user));
        }

        let position = UserPosition::new(user, self.clock.now());
        self.store
            .commit(StateBatch::new().with_position(position.clone()))?;

        tracing::info!(user = %position.user, "User initialized");
        Ok(position)
    }

    // === Operations ===

    /// Supply `amount` of `asset`, minting deposit shares
    pub fn deposit(
        &mut self,
        user: &UserId,
        asset: &AssetId,
        amount: u64,
    ) -> Result<OperationReceipt, LendingError> {
        ensure_positive(amount)?;
        let now = self.clock.now();
        let mut bank = self.accrued_bank(asset, now)?;
        let mut position = self.load_position(user)?;

        let shares = bank.deposit(amount)?;
        position.credit_deposit(asset, shares)?;

        let intent = TransferIntent::new(
            asset.clone(),
            amount,
            Endpoint::User(user.clone()),
            Endpoint::Vault(asset.clone()),
        );
        self.settle(Staged {
            kind: OperationKind::Deposit,
            user: user.clone(),
            asset: asset.clone(),
            amount,
            shares,
            bank,
            position,
            intent,
            now,
        })
    }

    /// Redeem `amount` of `asset`, burning deposit shares
    pub fn withdraw(
        &mut self,
        user: &UserId,
        asset: &AssetId,
        amount: u64,
    ) -> Result<OperationReceipt, LendingError> {
        ensure_positive(amount)?;
        let now = self.clock.now();
        let mut bank = self.accrued_bank(asset, now)?;
        let mut position = self.load_position(user)?;

        let held = position.deposit_shares(asset);
        let burned = bank.withdraw(amount, held)?;
        position.debit_deposit(asset, burned)?;

        self.ensure_healthy(&position, &bank, now)?;

        let intent = TransferIntent::new(
            asset.clone(),
            amount,
            Endpoint::Vault(asset.clone()),
            Endpoint::User(user.clone()),
        );
        self.settle(Staged {
            kind: OperationKind::Withdraw,
            user: user.clone(),
            asset: asset.clone(),
            amount,
            shares: burned,
            bank,
            position,
            intent,
            now,
        })
    }

    /// Borrow `amount` of `asset` against the user's deposits
    pub fn borrow(
        &mut self,
        user: &UserId,
        asset: &AssetId,
        amount: u64,
    ) -> Result<OperationReceipt, LendingError> {
        ensure_positive(amount)?;
        let now = self.clock.now();
        let mut bank = self.accrued_bank(asset, now)?;
        let mut position = self.load_position(user)?;

        if let Some(held) = position.borrow_assets().find(|held| *held != asset) {
            return Err(LendingError::BorrowAssetConflict {
                user: user.clone(),
                held: held.clone(),
                requested: asset.clone(),
            });
        }

        let shares = bank.borrow(amount)?;
        position.credit_borrow(asset, shares)?;

        self.ensure_healthy(&position, &bank, now)?;

        let intent = TransferIntent::new(
            asset.clone(),
            amount,
            Endpoint::Vault(asset.clone()),
            Endpoint::User(user.clone()),
        );
        self.settle(Staged {
            kind: OperationKind::Borrow,
            user: user.clone(),
            asset: asset.clone(),
            amount,
            shares,
            bank,
            position,
            intent,
            now,
        })
    }

    /// Pay back `amount` of `asset` debt, burning borrow shares
    pub fn repay(
        &mut self,
        user: &UserId,
        asset: &AssetId,
        amount: u64,
    ) -> Result<OperationReceipt, LendingError> {
        ensure_positive(amount)?;
        let now = self.clock.now();
        let mut bank = self.accrued_bank(asset, now)?;
        let mut position = self.load_position(user)?;

        let held = position.borrow_shares(asset);
        let burned = bank.repay(amount, held)?;
        position.debit_borrow(asset, burned)?;

        let intent = TransferIntent::new(
            asset.clone(),
            amount,
            Endpoint::User(user.clone()),
            Endpoint::Vault(asset.clone()),
        );
        self.settle(Staged {
            kind: OperationKind::Repay,
            user: user.clone(),
            asset: asset.clone(),
            amount,
            shares: burned,
            bank,
            position,
            intent,
            now,
        })
    }

    /// Accrue `asset`'s bank to now and persist the result
    pub fn accrue(&mut self, asset: &AssetId) -> Result<Bank, LendingError> {
        let now = self.clock.now();
        let mut bank = self.load_bank(asset)?;
        let interest = bank.accrue(now)?;
        self.store.commit(StateBatch::new().with_bank(bank.clone()))?;

        tracing::info!(
            asset = %asset,
            interest,
            total_borrowed = bank.total_borrowed,
            "Interest accrued"
        );
        Ok(bank)
    }

    // === Queries ===

    /// Bank as last committed
    pub fn bank(&self, asset: &AssetId) -> Result<Bank, LendingError> {
        self.load_bank(asset)
    }

    /// Position as last committed
    pub fn position(&self, user: &UserId) -> Result<UserPosition, LendingError> {
        self.load_position(user)
    }

    /// User's balances in one bank, with interest accrued to now
    pub fn balances(&self, user: &UserId, asset: &AssetId) -> Result<UserBalances, LendingError> {
        let bank = self.accrued_bank(asset, self.clock.now())?;
        let position = self.load_position(user)?;
        user_balances(&bank, &position)
    }

    /// Full valuation of a user's position at current prices
    pub fn health(&self, user: &UserId) -> Result<HealthReport, LendingError> {
        let position = self.load_position(user)?;
        self.evaluate(&position, None, self.clock.now())
    }

    // === Internals ===

    fn load_bank(&self, asset: &AssetId) -> Result<Bank, LendingError> {
        self.store
            .bank(asset)?
            .ok_or_else(|| LendingError::BankNotFound(asset.clone()))
    }

    fn load_position(&self, user: &UserId) -> Result<UserPosition, LendingError> {
        self.store
            .position(user)?
            .ok_or_else(|| LendingError::UserNotFound(user.clone()))
    }

    fn accrued_bank(&self, asset: &AssetId, now: i64) -> Result<Bank, LendingError> {
        let mut bank = self.load_bank(asset)?;
        bank.accrue(now)?;
        Ok(bank)
    }

    /// Value `position`, using `staged` in place of the stored bank it replaces
    fn evaluate(
        &self,
        position: &UserPosition,
        staged: Option<&Bank>,
        now: i64,
    ) -> Result<HealthReport, LendingError> {
        let mut banks = BTreeMap::new();
        for asset in position.deposit_assets().chain(position.borrow_assets()) {
            if banks.contains_key(asset) {
                continue;
            }
            let bank = match staged {
                Some(bank) if &bank.asset == asset => bank.clone(),
                _ => self.accrued_bank(asset, now)?,
            };
            banks.insert(asset.clone(), bank);
        }

        let mut prices = BTreeMap::new();
        for asset in banks.keys() {
            let quote = self
                .guard
                .price(self.oracle.as_ref(), asset, now)
                .map_err(|source| {
                    tracing::warn!(
                        user = %position.user,
                        asset = %asset,
                        error = %source,
                        "Rejected oracle price"
                    );
                    LendingError::StaleOracleData {
                        asset: asset.clone(),
                        source,
                    }
                })?;
            prices.insert(asset.clone(), quote.price);
        }

        health::evaluate(position, &banks, &prices)
    }

    /// Reject a post-operation state that breaches the liquidation threshold
    fn ensure_healthy(
        &self,
        position: &UserPosition,
        staged: &Bank,
        now: i64,
    ) -> Result<(), LendingError> {
        // Debt-free positions cannot be unhealthy
        if !position.has_debt() {
            return Ok(());
        }

        let report = self.evaluate(position, Some(staged), now)?;
        if !report.is_healthy() {
            tracing::warn!(
                user = %position.user,
                borrow_value = %report.borrow_value,
                borrow_limit = %report.borrow_limit,
                "Health check failed"
            );
            return Err(LendingError::HealthCheckFailed {
                user: position.user.clone(),
                borrow_value: report.borrow_value,
                borrow_limit: report.borrow_limit,
            });
        }
        Ok(())
    }

    /// Execute the transfer, then commit the staged state
    fn settle(&mut self, staged: Staged) -> Result<OperationReceipt, LendingError> {
        let transfer = self.transfer.transfer(&staged.intent).map_err(|e| {
            tracing::warn!(
                kind = %staged.kind,
                user = %staged.user,
                asset = %staged.asset,
                amount = staged.amount,
                error = %e,
                "Transfer failed; operation rolled back"
            );
            LendingError::TransferFailed(e)
        })?;

        let balances = user_balances(&staged.bank, &staged.position)?;

        let batch = StateBatch::new()
            .with_bank(staged.bank)
            .with_position(staged.position);
        if let Err(e) = self.store.commit(batch) {
            tracing::error!(
                kind = %staged.kind,
                intent_id = %staged.intent.id,
                error = %e,
                "Commit failed after completed transfer"
            );
            return Err(e.into());
        }

        tracing::info!(
            kind = %staged.kind,
            user = %staged.user,
            asset = %staged.asset,
            amount = staged.amount,
            shares = %staged.shares,
            "Operation committed"
        );

        Ok(OperationReceipt {
            id: Uuid::new_v4(),
            kind: staged.kind,
            user: staged.user,
            asset: staged.asset,
            amount: staged.amount,
            shares: staged.shares,
            balances,
            transfer,
            timestamp: DateTime::<Utc>::from_timestamp(staged.now, 0).unwrap_or_else(Utc::now),
        })
    }
}

fn ensure_positive(amount: u64) -> Result<(), LendingError> {
    if amount == 0 {
        return Err(LendingError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn user_balances(bank: &Bank, position: &UserPosition) -> Result<UserBalances, LendingError> {
    let deposit_shares = position.deposit_shares(&bank.asset);
    let borrow_shares = position.borrow_shares(&bank.asset);
    Ok(UserBalances {
        asset: bank.asset.clone(),
        deposit_shares,
        borrow_shares,
        redeemable: bank.redeemable(deposit_shares)?,
        owed: bank.owed(borrow_shares)?,
    })
}
