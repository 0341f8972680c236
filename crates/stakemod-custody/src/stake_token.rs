//! Fungible stake token usable as alternative collateral.
//!
//! Standard allowance model: a holder first approves the protocol's
//! custody account, then [`AssetLedger::transfer_in`] pulls the approved
//! amount. Custody is an ordinary token account owned by the protocol.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stakemod_types::{Address, Amount, ModerationError, Result};

use crate::{
    asset_ledger::{AssetLedger, ensure_positive},
    supply_conservation::SupplyConservation,
};

/// Fungible token ledger with allowances.
#[derive(Debug, Clone)]
pub struct StakeTokenLedger {
    symbol: String,
    /// Token account owned by the protocol.
    custody: Address,
    balances: HashMap<Address, Amount>,
    /// `(owner, spender) → remaining allowance`.
    allowances: HashMap<(Address, Address), Amount>,
    supply: SupplyConservation,
}

impl StakeTokenLedger {
    /// A token with no supply whose custody account is `custody`.
    #[must_use]
    pub fn new(symbol: impl Into<String>, custody: Address) -> Self {
        Self {
            symbol: symbol.into(),
            custody,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            supply: SupplyConservation::new(),
        }
    }

    /// The protocol's custody account.
    #[must_use]
    pub fn custody_account(&self) -> Address {
        self.custody
    }

    /// Issue new tokens to `to`.
    ///
    /// # Errors
    /// Returns `InvalidAmount` for non-positive amounts.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        self.supply.record_issue(amount);
        Ok(())
    }

    /// Destroy tokens held by `from`.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive amounts, `InsufficientFunds` if
    /// `from` holds less than `amount`.
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        self.debit(from, amount)?;
        self.supply.record_retire(amount);
        Ok(())
    }

    /// Move tokens between two holders.
    ///
    /// # Errors
    /// `InvalidAmount` for non-positive amounts, `InsufficientFunds` if
    /// `sender` holds less than `amount`.
    pub fn transfer(&mut self, sender: Address, to: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        self.debit(sender, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Set the amount `spender` may pull from `owner`.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.supply.expected_supply()
    }

    /// Verify that balances add up to the issued supply.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if value was created or destroyed.
    pub fn verify_supply(&self) -> Result<()> {
        let actual: Amount = self.balances.values().copied().sum();
        self.supply.verify(&self.symbol, actual)
    }

    fn debit(&mut self, from: Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(ModerationError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        *self.balances.entry(from).or_insert(Decimal::ZERO) -= amount;
        Ok(())
    }

    fn credit(&mut self, to: Address, amount: Amount) {
        *self.balances.entry(to).or_insert(Decimal::ZERO) += amount;
    }
}

impl AssetLedger for StakeTokenLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn transfer_in(&mut self, from: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        let approved = self.allowance(from, self.custody);
        if approved < amount {
            return Err(ModerationError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        self.debit(from, amount)?;
        self.credit(self.custody, amount);
        self.allowances.insert((from, self.custody), approved - amount);
        Ok(())
    }

    fn transfer_out(&mut self, to: Address, amount: Amount) -> Result<()> {
        ensure_positive(amount)?;
        self.debit(self.custody, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn balance_of(&self, who: Address) -> Amount {
        self.balances.get(&who).copied().unwrap_or(Decimal::ZERO)
    }

    fn custody_balance(&self) -> Amount {
        self.balance_of(self.custody)
    }
}
