//! # stakemod-types
//!
//! Shared types, errors, and configuration for the **StakeMod** moderation
//! protocol.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`ContestationId`], [`TxId`], [`TxContext`]
//! - **Stake model**: [`Role`], [`StakeAccount`], [`Amount`]
//! - **Contestation model**: [`Contestation`], [`ContestationState`], [`Outcome`]
//! - **Events**: [`ModerationEvent`], [`LoggedEvent`], [`TxReceipt`]
//! - **Configuration**: [`Settings`], [`ModerationPolicy`], [`ModerationConfig`]
//! - **Errors**: [`ModerationError`] with `SM_ERR_` prefix codes
//! - **Constants**: protocol defaults

pub mod config;
pub mod constants;
pub mod contestation;
pub mod error;
pub mod event;
pub mod ids;
pub mod stake;

// Re-export all primary types at crate root for ergonomic imports:
//   use stakemod_types::{Address, Contestation, Role, Settings, ...};

pub use config::*;
pub use contestation::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use stake::*;

// Constants are accessed via `stakemod_types::constants::FOO`
// (not re-exported to avoid name collisions).
