//! Error types for the StakeMod protocol.
//!
//! All errors use the `SM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Stake custody errors
//! - 2xx: Contestation opening errors
//! - 3xx: Voting errors
//! - 4xx: Cryptographic errors
//! - 5xx: Asset ledger errors
//! - 9xx: General / internal errors
//!
//! Every error is a rejected call: the operation that produced it applied
//! no state change.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, ContestationId, Role};

/// Central error enum for all StakeMod operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModerationError {
    // =================================================================
    // Stake Errors (1xx)
    // =================================================================
    /// The address already holds an active stake for this role.
    #[error("SM_ERR_100: {address} already holds an active {role} stake")]
    AlreadyStaked { address: Address, role: Role },

    /// The caller has no active poster stake to withdraw.
    #[error("SM_ERR_101: {0} holds no active poster stake")]
    NotStaked(Address),

    /// The payment does not equal the amount required for the role.
    #[error("SM_ERR_102: Wrong stake amount: expected {expected}, got {actual}")]
    WrongAmount { expected: Decimal, actual: Decimal },

    /// The stake backs an open contestation and cannot be withdrawn yet.
    #[error("SM_ERR_103: {role} stake of {address} is locked by {open} open contestation(s)")]
    StakeLocked {
        address: Address,
        role: Role,
        open: u32,
    },

    /// Deposits can only be made by the beneficiary itself.
    #[error("SM_ERR_104: Caller {caller} is not the beneficiary {beneficiary}")]
    NotBeneficiary {
        caller: Address,
        beneficiary: Address,
    },

    // =================================================================
    // Contestation Opening Errors (2xx)
    // =================================================================
    /// The caller has no active moderator stake.
    #[error("SM_ERR_200: {0} is not an active moderator")]
    NotAModerator(Address),

    /// The fee payment does not equal the configured contestation fee.
    #[error("SM_ERR_201: Wrong contestation fee: expected {expected}, got {actual}")]
    WrongFee { expected: Decimal, actual: Decimal },

    /// A certificate signature did not recover to the expected signer.
    #[error("SM_ERR_202: Invalid certificate: {reason}")]
    InvalidCertificate { reason: String },

    /// The certificate already backs an open contestation.
    #[error("SM_ERR_203: Certificate is already contested by open contestation {0}")]
    AlreadyContested(ContestationId),

    // =================================================================
    // Voting Errors (3xx)
    // =================================================================
    /// The contestation does not exist or is already closed.
    #[error("SM_ERR_300: Contestation {0} is not open")]
    NotOpen(ContestationId),

    /// The caller may not vote on this contestation.
    #[error("SM_ERR_301: {voter} is not eligible to vote on contestation {id}")]
    Ineligible { voter: Address, id: ContestationId },

    /// The caller already voted on this contestation.
    #[error("SM_ERR_302: {voter} already voted on contestation {id}")]
    AlreadyVoted { voter: Address, id: ContestationId },

    /// Too few votes have been recorded to close the contestation.
    #[error("SM_ERR_303: Contestation {id} has {votes} vote(s), {required} required to close")]
    QuorumNotReached {
        id: ContestationId,
        votes: u64,
        required: u64,
    },

    // =================================================================
    // Cryptographic Errors (4xx)
    // =================================================================
    /// The signature is malformed or recovers no valid public key.
    #[error("SM_ERR_400: Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// An address string could not be parsed.
    #[error("SM_ERR_401: Invalid address: {reason}")]
    InvalidAddress { reason: String },

    // =================================================================
    // Asset Ledger Errors (5xx)
    // =================================================================
    /// The paying account does not hold enough of the asset.
    #[error("SM_ERR_500: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// The token allowance granted to custody is too small.
    #[error("SM_ERR_501: Insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Decimal, approved: Decimal },

    /// Transfers must move a strictly positive amount.
    #[error("SM_ERR_502: Invalid transfer amount: {0}")]
    InvalidAmount(Decimal),

    /// Supply conservation invariant violated.
    #[error("SM_ERR_503: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, non-positive amounts, etc.).
    #[error("SM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("SM_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ModerationError>;

impl From<std::io::Error> for ModerationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ModerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
