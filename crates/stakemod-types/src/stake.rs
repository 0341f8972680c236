//! Stake accounts: collateral locked by an address to hold a role.
//!
//! An account is keyed by `(address, role)`. It is either inactive with a
//! zero amount, or active holding exactly the amount required for its role.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount of the collateral asset.
pub type Amount = Decimal;

/// The privilege a stake buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    /// May publish posts on the forum.
    Poster,
    /// May contest posts on the forum.
    Moderator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poster => write!(f, "POSTER"),
            Self::Moderator => write!(f, "MODERATOR"),
        }
    }
}

/// Collateral held by one address for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StakeAccount {
    /// Locked collateral. Zero while inactive.
    pub amount: Amount,
    /// Whether the role is currently granted.
    pub active: bool,
    /// Number of open contestations this stake is party to.
    pub locks: u32,
}

impl StakeAccount {
    /// An inactive, empty account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the account holding `amount`.
    pub fn activate(&mut self, amount: Amount) {
        self.amount = amount;
        self.active = true;
    }

    /// Deactivate the account, returning the amount it held.
    pub fn close(&mut self) -> Amount {
        let amount = self.amount;
        self.amount = Decimal::ZERO;
        self.active = false;
        amount
    }

    /// Whether an open contestation currently pins this stake.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locks > 0
    }
}
