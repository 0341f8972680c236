//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced by every asset ledger:
//! ```text
//! Σ(account balances) + custody == Σ(issued) - Σ(retired)
//! ```
//!
//! Stake deposits, refunds, fee collection and payouts only move value
//! between accounts and custody. If the invariant ever breaks, a transfer
//! created or destroyed value.

use rust_decimal::Decimal;
use stakemod_types::{Amount, ModerationError, Result};

/// Tracks the issued supply of one asset and validates conservation.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total value issued since genesis (funding, minting).
    issued: Amount,
    /// Total value taken out of circulation.
    retired: Amount,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            issued: Decimal::ZERO,
            retired: Decimal::ZERO,
        }
    }

    /// Record newly issued value.
    pub fn record_issue(&mut self, amount: Amount) {
        self.issued += amount;
    }

    /// Record value taken out of circulation.
    pub fn record_retire(&mut self, amount: Amount) {
        self.retired += amount;
    }

    /// Expected circulating supply: issued - retired.
    #[must_use]
    pub fn expected_supply(&self) -> Amount {
        self.issued - self.retired
    }

    /// Verify that the actual supply matches the expected supply.
    ///
    /// # Errors
    /// Returns [`ModerationError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, symbol: &str, actual_supply: Amount) -> Result<()> {
        let expected = self.expected_supply();
        if actual_supply != expected {
            return Err(ModerationError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {symbol}: actual supply {actual_supply} != expected {expected} \
                     (issued={}, retired={})",
                    self.issued, self.retired,
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_issued(&self) -> Amount {
        self.issued
    }

    #[must_use]
    pub fn total_retired(&self) -> Amount {
        self.retired
    }
}
