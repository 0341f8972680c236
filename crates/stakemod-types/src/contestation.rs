//! # Contestation: a moderator's dispute against a certified post
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  close (settled)  ┌────────┐
//!   │ OPEN ├──────────────────▶│ CLOSED │
//!   └──────┘                   └────────┘
//! ```
//!
//! Votes are accepted only while `OPEN`. The transition is one-way and
//! happens exactly once; the outcome is recorded at that moment.
//!
//! The poster and the moderator of record can never vote on their own
//! dispute. The check compares addresses, not live role status, so it
//! holds even if either party's stake changes while voting is running.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ContestationId, ModerationError, Result, Role, TxId};

/// Lifecycle state of a contestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestationState {
    /// Accepting votes.
    Open,
    /// Settled. **Terminal.**
    Closed,
}

impl ContestationState {
    /// Can this contestation move to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }
}

impl std::fmt::Display for ContestationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Result of a settled contestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Not settled yet.
    Unresolved,
    /// The contestation was upheld; the poster forfeits the role.
    PosterLoses,
    /// The contestation was rejected; the moderator forfeits the role.
    ModeratorLoses,
}

impl Outcome {
    /// The `(address, role)` that is revoked for this outcome, if any.
    #[must_use]
    pub fn losing_party(&self, poster: Address, moderator: Address) -> Option<(Address, Role)> {
        match self {
            Self::Unresolved => None,
            Self::PosterLoses => Some((poster, Role::Poster)),
            Self::ModeratorLoses => Some((moderator, Role::Moderator)),
        }
    }

    /// The address that prevails for this outcome, if any.
    #[must_use]
    pub fn prevailing_party(&self, poster: Address, moderator: Address) -> Option<Address> {
        match self {
            Self::Unresolved => None,
            Self::PosterLoses => Some(moderator),
            Self::ModeratorLoses => Some(poster),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved => write!(f, "UNRESOLVED"),
            Self::PosterLoses => write!(f, "POSTER_LOSES"),
            Self::ModeratorLoses => write!(f, "MODERATOR_LOSES"),
        }
    }
}

/// A dispute record and its vote tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestation {
    /// Dense index assigned at creation.
    pub id: ContestationId,
    /// Opaque certificate bytes, co-signed by the server and the poster.
    pub certificate: Vec<u8>,
    /// The accused poster.
    pub poster: Address,
    /// The contesting moderator (the opener).
    pub moderator: Address,
    /// Fee paid by the moderator to open the dispute.
    pub fee_paid: Amount,
    /// Current lifecycle state.
    pub state: ContestationState,
    /// Recorded votes: `true` upholds the contestation.
    pub votes: BTreeMap<Address, bool>,
    pub yay_count: u64,
    pub nay_count: u64,
    /// Set when the contestation closes.
    pub outcome: Outcome,
    /// Transaction that opened the contestation.
    pub opened_in: TxId,
    /// Transaction that closed the contestation.
    pub closed_in: Option<TxId>,
}

impl Contestation {
    /// A freshly opened contestation with empty tallies.
    #[must_use]
    pub fn open(
        id: ContestationId,
        certificate: Vec<u8>,
        poster: Address,
        moderator: Address,
        fee_paid: Amount,
        opened_in: TxId,
    ) -> Self {
        Self {
            id,
            certificate,
            poster,
            moderator,
            fee_paid,
            state: ContestationState::Open,
            votes: BTreeMap::new(),
            yay_count: 0,
            nay_count: 0,
            outcome: Outcome::Unresolved,
            opened_in,
            closed_in: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ContestationState::Open
    }

    /// Whether `who` is the accused or the accuser.
    #[must_use]
    pub fn is_party(&self, who: Address) -> bool {
        who == self.poster || who == self.moderator
    }

    #[must_use]
    pub fn has_voted(&self, who: Address) -> bool {
        self.votes.contains_key(&who)
    }

    /// Total number of recorded votes.
    #[must_use]
    pub fn vote_count(&self) -> u64 {
        self.yay_count + self.nay_count
    }

    /// Check that `voter` may vote now, without recording anything.
    ///
    /// # Errors
    /// - `NotOpen` if the contestation is closed
    /// - `Ineligible` if `voter` is the poster or the moderator of record
    /// - `AlreadyVoted` if `voter` already has a recorded vote
    pub fn check_vote(&self, voter: Address) -> Result<()> {
        if !self.is_open() {
            return Err(ModerationError::NotOpen(self.id));
        }
        if self.is_party(voter) {
            return Err(ModerationError::Ineligible { voter, id: self.id });
        }
        if self.has_voted(voter) {
            return Err(ModerationError::AlreadyVoted { voter, id: self.id });
        }
        Ok(())
    }

    /// Record a vote and bump the matching tally.
    ///
    /// # Errors
    /// Same as [`Contestation::check_vote`].
    pub fn record_vote(&mut self, voter: Address, vote: bool) -> Result<()> {
        self.check_vote(voter)?;
        self.votes.insert(voter, vote);
        if vote {
            self.yay_count += 1;
        } else {
            self.nay_count += 1;
        }
        Ok(())
    }

    /// Transition `OPEN → CLOSED` with the settled outcome.
    ///
    /// # Errors
    /// Returns `NotOpen` if the contestation is already closed.
    pub fn mark_closed(&mut self, outcome: Outcome, closed_in: TxId) -> Result<()> {
        if !self.state.can_transition_to(ContestationState::Closed) {
            return Err(ModerationError::NotOpen(self.id));
        }
        self.state = ContestationState::Closed;
        self.outcome = outcome;
        self.closed_in = Some(closed_in);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const POSTER: Address = Address([1; 20]);
    const MODERATOR: Address = Address([2; 20]);

    fn make() -> Contestation {
        Contestation::open(
            ContestationId(0),
            POSTER.to_word().to_vec(),
            POSTER,
            MODERATOR,
            Decimal::new(10, 0),
            TxId(0),
        )
    }

    #[test]
    fn state_transitions() {
        assert!(ContestationState::Open.can_transition_to(ContestationState::Closed));
        assert!(!ContestationState::Closed.can_transition_to(ContestationState::Open));
        assert!(!ContestationState::Closed.can_transition_to(ContestationState::Closed));
    }

    #[test]
    fn opened_contestation_is_empty() {
        let c = make();
        assert!(c.is_open());
        assert_eq!(c.vote_count(), 0);
        assert_eq!(c.outcome, Outcome::Unresolved);
        assert!(c.closed_in.is_none());
    }

    #[test]
    fn votes_update_tallies() {
        let mut c = make();
        c.record_vote(Address([3; 20]), true).unwrap();
        c.record_vote(Address([4; 20]), false).unwrap();
        c.record_vote(Address([5; 20]), true).unwrap();
        assert_eq!(c.yay_count, 2);
        assert_eq!(c.nay_count, 1);
        assert!(c.has_voted(Address([4; 20])));
    }

    #[test]
    fn parties_cannot_vote() {
        let mut c = make();
        let err = c.record_vote(POSTER, false).unwrap_err();
        assert!(matches!(err, ModerationError::Ineligible { .. }));
        let err = c.record_vote(MODERATOR, true).unwrap_err();
        assert!(matches!(err, ModerationError::Ineligible { .. }));
        assert_eq!(c.vote_count(), 0);
    }

    #[test]
    fn double_vote_blocked() {
        let mut c = make();
        let voter = Address([9; 20]);
        c.record_vote(voter, true).unwrap();
        let err = c.record_vote(voter, false).unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyVoted { .. }));
        assert_eq!(c.yay_count, 1);
        assert_eq!(c.nay_count, 0);
    }

    #[test]
    fn closed_rejects_votes_and_second_close() {
        let mut c = make();
        c.mark_closed(Outcome::PosterLoses, TxId(7)).unwrap();
        assert_eq!(c.closed_in, Some(TxId(7)));

        let err = c.record_vote(Address([3; 20]), true).unwrap_err();
        assert_eq!(err, ModerationError::NotOpen(ContestationId(0)));

        let err = c.mark_closed(Outcome::ModeratorLoses, TxId(8)).unwrap_err();
        assert_eq!(err, ModerationError::NotOpen(ContestationId(0)));
        assert_eq!(c.outcome, Outcome::PosterLoses);
    }

    #[test]
    fn outcome_parties() {
        assert_eq!(
            Outcome::PosterLoses.losing_party(POSTER, MODERATOR),
            Some((POSTER, Role::Poster))
        );
        assert_eq!(
            Outcome::ModeratorLoses.prevailing_party(POSTER, MODERATOR),
            Some(POSTER)
        );
        assert_eq!(Outcome::Unresolved.losing_party(POSTER, MODERATOR), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut c = make();
        c.record_vote(Address([3; 20]), true).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: Contestation = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
