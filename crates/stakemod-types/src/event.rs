//! Domain events emitted by state-changing operations.
//!
//! Each successful call returns the events it produced, in emission order,
//! and the event log stores them tagged with the call's [`TxId`].

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, ContestationId, Outcome, Role, TxId};

/// Something observable that happened to the stake ledger or a contestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModerationEvent {
    /// A role was activated by locking collateral.
    StakeDeposited {
        address: Address,
        role: Role,
        amount: Amount,
    },
    /// A role was given up and its collateral refunded.
    StakeWithdrawn {
        address: Address,
        role: Role,
        amount: Amount,
    },
    /// A moderator opened a contestation.
    ContestationOpened {
        id: ContestationId,
        poster: Address,
        moderator: Address,
        fee: Amount,
    },
    /// A vote was recorded.
    VoteCast {
        id: ContestationId,
        voter: Address,
        vote: bool,
    },
    /// The losing party of a contestation lost its role.
    RoleRevoked { address: Address, role: Role },
    /// A contestation was settled.
    ContestationClosed { id: ContestationId, outcome: Outcome },
}

impl ModerationEvent {
    /// Short upper-case name, for log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StakeDeposited { .. } => "STAKE_DEPOSITED",
            Self::StakeWithdrawn { .. } => "STAKE_WITHDRAWN",
            Self::ContestationOpened { .. } => "CONTESTATION_OPENED",
            Self::VoteCast { .. } => "VOTE_CAST",
            Self::RoleRevoked { .. } => "ROLE_REVOKED",
            Self::ContestationClosed { .. } => "CONTESTATION_CLOSED",
        }
    }
}

impl std::fmt::Display for ModerationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// An event as stored in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at zero.
    pub seq: u64,
    /// The call that emitted the event.
    pub tx: TxId,
    pub event: ModerationEvent,
}

/// Events emitted by one successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx: TxId,
    pub events: Vec<ModerationEvent>,
}

impl TxReceipt {
    /// Event kinds in emission order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(ModerationEvent::kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_display() {
        let ev = ModerationEvent::RoleRevoked {
            address: Address::ZERO,
            role: Role::Poster,
        };
        assert_eq!(ev.to_string(), "ROLE_REVOKED");
        let ev = ModerationEvent::ContestationClosed {
            id: ContestationId(0),
            outcome: Outcome::PosterLoses,
        };
        assert_eq!(ev.kind(), "CONTESTATION_CLOSED");
    }

    #[test]
    fn receipt_kinds_in_order() {
        let receipt = TxReceipt {
            tx: TxId(4),
            events: vec![
                ModerationEvent::RoleRevoked {
                    address: Address::ZERO,
                    role: Role::Moderator,
                },
                ModerationEvent::ContestationClosed {
                    id: ContestationId(1),
                    outcome: Outcome::ModeratorLoses,
                },
            ],
        };
        assert_eq!(receipt.kinds(), vec!["ROLE_REVOKED", "CONTESTATION_CLOSED"]);
    }

    #[test]
    fn event_serializes_with_tag() {
        let ev = ModerationEvent::VoteCast {
            id: ContestationId(2),
            voter: Address([3; 20]),
            vote: true,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "vote_cast");
        let back: ModerationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
