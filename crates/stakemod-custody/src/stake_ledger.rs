//! Stake ledger: grants and revokes roles against locked collateral.
//!
//! Each `(address, role)` account is either inactive and empty, or active
//! holding exactly the amount the settings require for that role. Role
//! checks elsewhere in the protocol read [`StakeLedger::has_role`]; they
//! never re-derive roles from balances.
//!
//! Custody holds three kinds of value:
//! - active stakes
//! - fees of contestations that are still open
//! - forfeited stake retained as treasury

use std::collections::HashMap;

use rust_decimal::Decimal;
use stakemod_types::{
    Address, Amount, ModerationError, ModerationEvent, Result, Role, Settings, StakeAccount,
    TxContext,
};

use crate::asset_ledger::AssetLedger;

/// Per-(address, role) collateral accounts backed by an [`AssetLedger`].
#[derive(Debug, Clone)]
pub struct StakeLedger<A> {
    asset: A,
    settings: Settings,
    accounts: HashMap<(Address, Role), StakeAccount>,
    /// Forfeited stake kept in custody.
    treasury: Amount,
}

impl<A: AssetLedger> StakeLedger<A> {
    #[must_use]
    pub fn new(asset: A, settings: Settings) -> Self {
        Self {
            asset,
            settings,
            accounts: HashMap::new(),
            treasury: Decimal::ZERO,
        }
    }

    /// Lock `payment` to activate `role` for `beneficiary`.
    ///
    /// # Errors
    /// - `NotBeneficiary` if the caller is not `beneficiary`
    /// - `AlreadyStaked` if the role is already active
    /// - `WrongAmount` if `payment` differs from the required stake
    /// - any transfer error from the asset ledger
    pub fn deposit(
        &mut self,
        ctx: &TxContext,
        beneficiary: Address,
        role: Role,
        payment: Amount,
    ) -> Result<ModerationEvent> {
        if ctx.sender != beneficiary {
            return Err(ModerationError::NotBeneficiary {
                caller: ctx.sender,
                beneficiary,
            });
        }
        if self.has_role(beneficiary, role) {
            return Err(ModerationError::AlreadyStaked {
                address: beneficiary,
                role,
            });
        }
        let required = self.settings.stake_for(role);
        if payment != required {
            return Err(ModerationError::WrongAmount {
                expected: required,
                actual: payment,
            });
        }

        self.asset.transfer_in(beneficiary, payment)?;
        self.accounts
            .entry((beneficiary, role))
            .or_default()
            .activate(payment);

        tracing::info!(
            address = %beneficiary,
            role = %role,
            amount = %payment,
            asset = self.asset.symbol(),
            "Stake deposited"
        );
        Ok(ModerationEvent::StakeDeposited {
            address: beneficiary,
            role,
            amount: payment,
        })
    }

    /// Close the caller's `role` stake and refund it in full.
    ///
    /// # Errors
    /// - `NotStaked` (poster) / `NotAModerator` (moderator) if the role is
    ///   not active
    /// - `StakeLocked` while the caller is party to an open contestation
    /// - any transfer error from the asset ledger
    pub fn withdraw(&mut self, ctx: &TxContext, role: Role) -> Result<ModerationEvent> {
        let who = ctx.sender;
        let Some(account) = self.accounts.get_mut(&(who, role)).filter(|a| a.active) else {
            return Err(match role {
                Role::Poster => ModerationError::NotStaked(who),
                Role::Moderator => ModerationError::NotAModerator(who),
            });
        };
        if account.is_locked() {
            return Err(ModerationError::StakeLocked {
                address: who,
                role,
                open: account.locks,
            });
        }

        // Close before paying out; reopen if the transfer is rejected.
        let refund = account.close();
        if let Err(err) = self.asset.transfer_out(who, refund) {
            account.activate(refund);
            return Err(err);
        }

        tracing::info!(
            address = %who,
            role = %role,
            amount = %refund,
            "Stake withdrawn"
        );
        Ok(ModerationEvent::StakeWithdrawn {
            address: who,
            role,
            amount: refund,
        })
    }

    /// # Errors
    /// As [`StakeLedger::deposit`].
    pub fn deposit_poster_stake(
        &mut self,
        ctx: &TxContext,
        beneficiary: Address,
        payment: Amount,
    ) -> Result<ModerationEvent> {
        self.deposit(ctx, beneficiary, Role::Poster, payment)
    }

    /// # Errors
    /// As [`StakeLedger::withdraw`].
    pub fn withdraw_poster_stake(&mut self, ctx: &TxContext) -> Result<ModerationEvent> {
        self.withdraw(ctx, Role::Poster)
    }

    /// # Errors
    /// As [`StakeLedger::deposit`].
    pub fn deposit_moderator_stake(
        &mut self,
        ctx: &TxContext,
        beneficiary: Address,
        payment: Amount,
    ) -> Result<ModerationEvent> {
        self.deposit(ctx, beneficiary, Role::Moderator, payment)
    }

    /// # Errors
    /// As [`StakeLedger::withdraw`].
    pub fn withdraw_moderator_stake(&mut self, ctx: &TxContext) -> Result<ModerationEvent> {
        self.withdraw(ctx, Role::Moderator)
    }

    /// Pull a contestation fee from `from` into custody.
    ///
    /// # Errors
    /// Any transfer error from the asset ledger.
    pub fn collect_fee(&mut self, from: Address, amount: Amount) -> Result<()> {
        self.asset.transfer_in(from, amount)
    }

    /// Pin a stake while its holder is party to an open contestation.
    pub fn lock(&mut self, who: Address, role: Role) {
        self.accounts.entry((who, role)).or_default().locks += 1;
    }

    /// Release one pin placed by [`StakeLedger::lock`].
    pub fn unlock(&mut self, who: Address, role: Role) {
        if let Some(account) = self.accounts.get_mut(&(who, role)) {
            account.locks = account.locks.saturating_sub(1);
        }
    }

    /// Deactivate a role without refunding it. The stake stays in custody
    /// and its amount is returned for the caller to dispose of.
    /// Revoking an inactive role forfeits nothing.
    pub fn revoke(&mut self, who: Address, role: Role) -> Amount {
        let forfeited = self
            .accounts
            .get_mut(&(who, role))
            .filter(|a| a.active)
            .map_or(Decimal::ZERO, StakeAccount::close);
        tracing::info!(
            address = %who,
            role = %role,
            forfeited = %forfeited,
            "Role revoked"
        );
        forfeited
    }

    /// Pay `amount` out of custody. Zero amounts are a no-op.
    ///
    /// # Errors
    /// Any transfer error from the asset ledger.
    pub fn payout(&mut self, to: Address, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.asset.transfer_out(to, amount)
    }

    /// Keep `amount` of custody as treasury.
    pub fn retain(&mut self, amount: Amount) {
        self.treasury += amount;
    }

    /// The account for `(who, role)`; inactive and empty if never used.
    #[must_use]
    pub fn account(&self, who: Address, role: Role) -> StakeAccount {
        self.accounts
            .get(&(who, role))
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_role(&self, who: Address, role: Role) -> bool {
        self.accounts.get(&(who, role)).is_some_and(|a| a.active)
    }

    /// Whether `who` holds an active stake of either role.
    #[must_use]
    pub fn has_any_role(&self, who: Address) -> bool {
        self.has_role(who, Role::Poster) || self.has_role(who, Role::Moderator)
    }

    /// Sum of all active stakes.
    #[must_use]
    pub fn total_staked(&self) -> Amount {
        self.accounts
            .values()
            .filter(|a| a.active)
            .map(|a| a.amount)
            .sum()
    }

    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.treasury
    }

    #[must_use]
    pub fn custody_balance(&self) -> Amount {
        self.asset.custody_balance()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn asset(&self) -> &A {
        &self.asset
    }

    /// Mutable access to the asset ledger, for funding and approvals.
    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }
}
