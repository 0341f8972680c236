//! Protocol-wide constants for StakeMod.

/// Default collateral required to hold the poster role.
pub const DEFAULT_POSTER_STAKE: i64 = 100;

/// Default collateral required to hold the moderator role.
pub const DEFAULT_MODERATOR_STAKE: i64 = 50;

/// Default fee a moderator pays to open a contestation.
pub const DEFAULT_CONTESTATION_FEE: i64 = 10;

/// Default number of votes a contestation needs before it can be closed.
pub const DEFAULT_MIN_VOTES: u64 = 1;

/// Prefix of the personal-message digest that certificate signers sign.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// Symbol of the chain-native collateral asset.
pub const NATIVE_SYMBOL: &str = "NATIVE";

/// Default symbol of the fungible stake token.
pub const STAKE_TOKEN_SYMBOL: &str = "STAKE";
