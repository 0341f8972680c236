//! Settlement of a closed vote.
//!
//! 1. Tally the votes into an outcome
//! 2. Check custody can cover the payout
//! 3. Pay the fee (and, by policy, the forfeited stake) to the prevailing party
//! 4. Revoke the losing party's role
//! 5. Retain the forfeited stake as treasury if policy says so
//! 6. Emit `RoleRevoked` then `ContestationClosed`
//!
//! The payout is the only step that can fail and it runs first, so a
//! rejected settlement leaves the ledger untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stakemod_custody::{AssetLedger, StakeLedger};
use stakemod_types::{
    Address, Amount, Contestation, ContestationId, ForfeitPolicy, ModerationError,
    ModerationEvent, ModerationPolicy, Outcome, Result, Role,
};

use crate::verdict::tally;

/// What a settlement will do, decided without touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub id: ContestationId,
    pub outcome: Outcome,
    /// The address and role to revoke.
    pub loser: Address,
    pub losing_role: Role,
    /// Receives the fee, and the forfeited stake under
    /// [`ForfeitPolicy::ToPrevailingParty`].
    pub prevailing: Address,
    pub fee: Amount,
    pub forfeit: ForfeitPolicy,
}

/// What a settlement did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub outcome: Outcome,
    /// Stake taken from the loser (zero if the role was already inactive).
    pub forfeited: Amount,
    /// Total paid out of custody to the prevailing party.
    pub paid_out: Amount,
    /// Forfeited stake kept as treasury.
    pub retained: Amount,
    /// `[RoleRevoked, ContestationClosed]`.
    pub events: Vec<ModerationEvent>,
}

/// Computes and applies contestation outcomes under a fixed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    policy: ModerationPolicy,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(policy: ModerationPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    /// Decide the outcome of an open contestation. Pure.
    ///
    /// # Errors
    /// Returns `NotOpen` if the contestation is already closed.
    pub fn plan(&self, contestation: &Contestation) -> Result<SettlementPlan> {
        if !contestation.is_open() {
            return Err(ModerationError::NotOpen(contestation.id));
        }
        let outcome = tally(
            contestation.yay_count,
            contestation.nay_count,
            self.policy.tie_break,
        );
        let (loser, losing_role) = outcome
            .losing_party(contestation.poster, contestation.moderator)
            .ok_or_else(|| ModerationError::Internal("tally left outcome unresolved".into()))?;
        let prevailing = outcome
            .prevailing_party(contestation.poster, contestation.moderator)
            .ok_or_else(|| ModerationError::Internal("tally left outcome unresolved".into()))?;

        Ok(SettlementPlan {
            id: contestation.id,
            outcome,
            loser,
            losing_role,
            prevailing,
            fee: contestation.fee_paid,
            forfeit: self.policy.forfeit,
        })
    }

    /// Execute a plan against the stake ledger.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if custody (minus treasury) cannot
    /// cover the payout, or any transfer error from the asset ledger. In
    /// both cases nothing was changed.
    pub fn apply<A: AssetLedger>(
        &self,
        plan: &SettlementPlan,
        ledger: &mut StakeLedger<A>,
    ) -> Result<SettlementReport> {
        let forfeited = if ledger.has_role(plan.loser, plan.losing_role) {
            ledger.account(plan.loser, plan.losing_role).amount
        } else {
            Decimal::ZERO
        };
        let (paid_out, retained) = match plan.forfeit {
            ForfeitPolicy::ToPrevailingParty => (plan.fee + forfeited, Decimal::ZERO),
            ForfeitPolicy::Retain => (plan.fee, forfeited),
        };

        let spendable = ledger.custody_balance() - ledger.treasury_balance();
        if spendable < paid_out {
            return Err(ModerationError::SupplyInvariantViolation {
                reason: format!(
                    "settlement of {} needs {paid_out} but custody only holds {spendable} spendable",
                    plan.id
                ),
            });
        }

        ledger.payout(plan.prevailing, paid_out)?;
        ledger.revoke(plan.loser, plan.losing_role);
        if !retained.is_zero() {
            ledger.retain(retained);
        }

        tracing::info!(
            id = %plan.id,
            outcome = %plan.outcome,
            loser = %plan.loser,
            prevailing = %plan.prevailing,
            paid_out = %paid_out,
            retained = %retained,
            "Contestation settled"
        );

        Ok(SettlementReport {
            outcome: plan.outcome,
            forfeited,
            paid_out,
            retained,
            events: vec![
                ModerationEvent::RoleRevoked {
                    address: plan.loser,
                    role: plan.losing_role,
                },
                ModerationEvent::ContestationClosed {
                    id: plan.id,
                    outcome: plan.outcome,
                },
            ],
        })
    }
}
