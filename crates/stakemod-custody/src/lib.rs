//! # stakemod-custody
//!
//! **Custody plane**: holds the collateral that backs every role.
//!
//! ## Architecture
//!
//! 1. **AssetLedger**: the value-transfer primitive. Either the chain's
//!    native value ([`NativeLedger`]) or a fungible stake token
//!    ([`StakeTokenLedger`]); the rest of the protocol only sees the trait
//! 2. **StakeLedger**: per-(address, role) stake accounts; grants and
//!    revokes roles, holds fees and forfeited stake in custody
//! 3. **SupplyConservation**: checks that transfers never mint or burn value
//!
//! ## Stake Flow
//!
//! ```text
//! deposit:  AssetLedger.transfer_in(sender) → StakeAccount.activate()
//! withdraw: StakeAccount.close() → AssetLedger.transfer_out(sender)
//! ```

pub mod asset_ledger;
pub mod stake_ledger;
pub mod stake_token;
pub mod supply_conservation;

pub use asset_ledger::{AssetLedger, NativeLedger};
pub use stake_ledger::StakeLedger;
pub use stake_token::StakeTokenLedger;
pub use supply_conservation::SupplyConservation;
