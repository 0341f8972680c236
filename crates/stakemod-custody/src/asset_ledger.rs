//! The value-transfer primitive that collateral moves through.
//!
//! The protocol is asset-agnostic: stake deposits, refunds, fees and
//! payouts all go through [`AssetLedger`]. Every transfer is atomic: it
//! either moves the full amount or fails without touching any balance.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stakemod_types::{Address, Amount, ModerationError, Result, constants};

use crate::supply_conservation::SupplyConservation;

/// Moves value between external accounts and protocol custody.
pub trait AssetLedger {
    /// Ticker of the collateral asset.
    fn symbol(&self) -> &str;

    /// Move `amount` from `from` into custody.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive amounts, `InsufficientFunds` (or
    /// `InsufficientAllowance` for tokens) if `from` cannot pay.
    fn transfer_in(&mut self, from: Address, amount: Amount) -> Result<()>;

    /// Move `amount` out of custody to `to`.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive amounts, `InsufficientFunds` if
    /// custody holds less than `amount`.
    fn transfer_out(&mut self, to: Address, amount: Amount) -> Result<()>;

    /// Balance of an external account.
    fn balance_of(&self, who: Address) -> Amount;

    /// Value currently held in custody.
    fn custody_balance(&self) -> Amount;
}

/// Reject zero and negative transfer amounts.
pub(crate) fn ensure_positive(amount: Amount) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(ModerationError::InvalidAmount(amount));
    }
    Ok(())
}

/// The chain's native value.
///
/// Accounts are credited out of band by [`NativeLedger::fund`] (genesis
/// allocation, faucet); the protocol only ever moves existing value.
#[derive(Debug, Clone, Default)]
pub struct NativeLedger {
    /// Per-address spendable balance.
    balances: HashMap<Address, Amount>,
    /// Value held by the protocol.
    custody: Amount,
    supply: SupplyConservation,
}

impl NativeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `who` with newly issued value.
    pub fn fund(&mut self, who: Address, amount: Amount) {
        *self.balances.entry(who).or_insert(Decimal::ZERO) += amount;
        self.supply.record_issue(amount);
    }

    /// Verify supply conservation across all accounts and custody.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if value was created or destroyed.
    pub fn verify_supply(&self) -> Result<()> {
        let actual: Amount = self.balances.values().copied().sum::<Amount>() + self.custody;
        self.supply.verify(constants::NATIVE_SYMBOL, actual)
    }
}

impl AssetLedger for NativeLedger {
    fn symbol(&self) -> &str {
        constants::NATIVE_SYMBOL
    }

    fn transfer_in(&mut self, from: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        let balance = self.balances.get_mut(&from).ok_or(ModerationError::InsufficientFunds {
            needed: amount,
            available: Decimal::ZERO,
        })?;
        if *balance < amount {
            return Err(ModerationError::InsufficientFunds {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        self.custody += amount;
        Ok(())
    }

    fn transfer_out(&mut self, to: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        if self.custody < amount {
            return Err(ModerationError::InsufficientFunds {
                needed: amount,
                available: self.custody,
            });
        }
        self.custody -= amount;
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    fn balance_of(&self, who: Address) -> Amount {
        self.balances.get(&who).copied().unwrap_or(Decimal::ZERO)
    }

    fn custody_balance(&self) -> Amount {
        self.custody
    }
}
