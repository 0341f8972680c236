//! # stakemod-settlement
//!
//! **Settlement plane**: turns a finished vote into fund movements and a
//! role revocation.
//!
//! ## Architecture
//!
//! Settlement is split in two so the decision can be tested in isolation:
//! 1. **Compute** ([`tally`], [`SettlementEngine::plan`]): pure, decides the
//!    outcome, the losing party and who gets paid
//! 2. **Apply** ([`SettlementEngine::apply`]): pays the prevailing party,
//!    revokes the losing role, emits the terminal events
//!
//! ## Terminal Events
//!
//! Every settlement emits exactly two events, in this order:
//! `RoleRevoked(loser, role)` then `ContestationClosed(id, outcome)`.

pub mod settler;
pub mod verdict;

pub use settler::{SettlementEngine, SettlementPlan, SettlementReport};
pub use verdict::tally;
