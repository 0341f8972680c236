//! Configuration for a StakeMod deployment.
//!
//! [`Settings`] are fixed at construction and never change afterwards.
//! [`ModerationPolicy`] pins down the dispute rules that the vote alone
//! does not decide (ties, forfeited collateral, voter eligibility).

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ModerationError, Result, Role, constants};

/// Stake and fee amounts, fixed for the lifetime of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Collateral required to hold the poster role.
    pub poster_stake_amount: Amount,
    /// Collateral required to hold the moderator role.
    pub moderator_stake_amount: Amount,
    /// Fee a moderator pays to open a contestation.
    pub contestation_fee: Amount,
}

impl Settings {
    /// Build settings, rejecting non-positive amounts.
    ///
    /// # Errors
    /// Returns `Configuration` if any amount is zero or negative.
    pub fn new(
        poster_stake_amount: Amount,
        moderator_stake_amount: Amount,
        contestation_fee: Amount,
    ) -> Result<Self> {
        let settings = Self {
            poster_stake_amount,
            moderator_stake_amount,
            contestation_fee,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// Returns `Configuration` if any amount is zero or negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("poster_stake_amount", self.poster_stake_amount),
            ("moderator_stake_amount", self.moderator_stake_amount),
            ("contestation_fee", self.contestation_fee),
        ] {
            if value <= Decimal::ZERO {
                return Err(ModerationError::Configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Collateral required for `role`.
    #[must_use]
    pub fn stake_for(&self, role: Role) -> Amount {
        match role {
            Role::Poster => self.poster_stake_amount,
            Role::Moderator => self.moderator_stake_amount,
        }
    }

    /// The `(poster, moderator, fee)` triple, in declaration order.
    #[must_use]
    pub fn as_tuple(&self) -> (Amount, Amount, Amount) {
        (
            self.poster_stake_amount,
            self.moderator_stake_amount,
            self.contestation_fee,
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poster_stake_amount: Decimal::new(constants::DEFAULT_POSTER_STAKE, 0),
            moderator_stake_amount: Decimal::new(constants::DEFAULT_MODERATOR_STAKE, 0),
            contestation_fee: Decimal::new(constants::DEFAULT_CONTESTATION_FEE, 0),
        }
    }
}

/// Who loses when `yay_count == nay_count` (including no votes at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The accused poster keeps the role; the moderator loses.
    #[default]
    FavorPoster,
    /// The contestation is upheld; the poster loses.
    FavorModerator,
}

/// Where the revoked stake of the losing party goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitPolicy {
    /// Paid to the prevailing party along with the fee.
    #[default]
    ToPrevailingParty,
    /// Kept in custody as protocol treasury.
    Retain,
}

/// Dispute rules applied by the contestation and settlement engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationPolicy {
    pub tie_break: TieBreak,
    pub forfeit: ForfeitPolicy,
    /// Require voters to hold an active stake of either role.
    pub require_voter_stake: bool,
    /// Votes that must be recorded before anyone can close a contestation.
    pub min_votes: u64,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            forfeit: ForfeitPolicy::default(),
            require_voter_stake: false,
            min_votes: constants::DEFAULT_MIN_VOTES,
        }
    }
}

/// Full deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Stake and fee amounts.
    #[serde(default)]
    pub settings: Settings,
    /// Address of the trusted server that co-signs certificates.
    pub server_address: Address,
    /// Dispute rules.
    #[serde(default)]
    pub policy: ModerationPolicy,
}

impl ModerationConfig {
    /// Default settings and policy for the given server.
    #[must_use]
    pub fn new(server_address: Address) -> Self {
        Self {
            settings: Settings::default(),
            server_address,
            policy: ModerationPolicy::default(),
        }
    }

    /// # Errors
    /// Returns `Configuration` for non-positive amounts or a zero server address.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        if self.server_address.is_zero() {
            return Err(ModerationError::Configuration(
                "server_address must not be the zero address".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns `Serialization` for malformed JSON and `Configuration` for
    /// invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`ModerationConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
