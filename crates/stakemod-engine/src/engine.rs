//! Contestation engine. Drives each dispute through `OPEN → CLOSED`.
//!
//! ## Opening
//!
//! 1. Caller must hold an active moderator stake
//! 2. Fee must equal the configured contestation fee
//! 3. Certificate must be signed by the registered server and by the poster
//! 4. Certificate must not back another open contestation
//! 5. Fee moves into custody; both parties' stakes are locked
//!
//! ## Voting
//!
//! Any address except the poster and moderator of record may vote once
//! while the contestation is open. Policy may additionally require voters
//! to hold a stake of either role.
//!
//! ## Closing
//!
//! Anyone may close an open contestation once it has collected the
//! policy's `min_votes`. The record is marked `CLOSED` before funds move;
//! if settlement is rejected the record is restored.

use serde::{Deserialize, Serialize};
use stakemod_attest::{CertificateVerifier, Secp256k1Verifier, Signature, SignatureVerifier};
use stakemod_custody::{AssetLedger, StakeLedger};
use stakemod_settlement::{SettlementEngine, SettlementReport};
use stakemod_types::{
    Address, Amount, Contestation, ContestationId, ModerationError, ModerationEvent,
    ModerationPolicy, Result, Role, TxContext, TxId,
};

use crate::store::ContestationStore;

/// Arguments of an open-contestation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    /// The accused poster.
    pub poster: Address,
    /// Opaque certificate bytes.
    pub certificate: Vec<u8>,
    /// Server signature over the certificate hash (personal message).
    pub server_signature: Signature,
    /// Poster signature over the certificate hash (personal message).
    pub poster_signature: Signature,
    /// Fee paid with the call.
    pub fee: Amount,
}

/// Owns the contestation records and enforces the dispute rules.
#[derive(Debug, Clone)]
pub struct ContestationEngine<V = Secp256k1Verifier> {
    store: ContestationStore,
    certificates: CertificateVerifier<V>,
    settlement: SettlementEngine,
    require_voter_stake: bool,
    min_votes: u64,
}

impl ContestationEngine {
    #[must_use]
    pub fn new(server: Address, policy: ModerationPolicy) -> Self {
        Self::with_verifier(CertificateVerifier::new(server), policy)
    }
}

impl<V: SignatureVerifier> ContestationEngine<V> {
    #[must_use]
    pub fn with_verifier(certificates: CertificateVerifier<V>, policy: ModerationPolicy) -> Self {
        Self {
            store: ContestationStore::new(),
            certificates,
            settlement: SettlementEngine::new(policy),
            require_voter_stake: policy.require_voter_stake,
            min_votes: policy.min_votes,
        }
    }

    /// Open a contestation against `request.poster`.
    ///
    /// # Errors
    /// - `NotAModerator` if the caller has no active moderator stake
    /// - `WrongFee` if the fee differs from the configured fee
    /// - `InvalidCertificate` / `InvalidSignature` if the attestation fails
    /// - `AlreadyContested` if the certificate backs an open contestation
    /// - any transfer error while collecting the fee
    pub fn open<A: AssetLedger>(
        &mut self,
        ledger: &mut StakeLedger<A>,
        ctx: &TxContext,
        tx: TxId,
        request: OpenRequest,
    ) -> Result<(ContestationId, ModerationEvent)> {
        let moderator = ctx.sender;
        if !ledger.has_role(moderator, Role::Moderator) {
            tracing::warn!(caller = %moderator, "Contestation rejected: not a moderator");
            return Err(ModerationError::NotAModerator(moderator));
        }
        let expected = ledger.settings().contestation_fee;
        if request.fee != expected {
            return Err(ModerationError::WrongFee {
                expected,
                actual: request.fee,
            });
        }
        if let Err(err) = self.certificates.verify(
            request.poster,
            &request.certificate,
            &request.server_signature,
            &request.poster_signature,
        ) {
            tracing::warn!(
                moderator = %moderator,
                poster = %request.poster,
                error = %err,
                "Contestation rejected: certificate does not verify"
            );
            return Err(err);
        }
        if let Some(existing) = self.store.open_for_certificate(&request.certificate) {
            tracing::warn!(
                moderator = %moderator,
                existing = %existing,
                "Contestation rejected: certificate already contested"
            );
            return Err(ModerationError::AlreadyContested(existing));
        }

        ledger.collect_fee(moderator, request.fee)?;

        let id = self.store.next_id();
        self.store.insert(Contestation::open(
            id,
            request.certificate,
            request.poster,
            moderator,
            request.fee,
            tx,
        ))?;
        ledger.lock(request.poster, Role::Poster);
        ledger.lock(moderator, Role::Moderator);

        tracing::info!(
            id = %id,
            poster = %request.poster,
            moderator = %moderator,
            fee = %request.fee,
            "Contestation opened"
        );
        Ok((
            id,
            ModerationEvent::ContestationOpened {
                id,
                poster: request.poster,
                moderator,
                fee: request.fee,
            },
        ))
    }

    /// Record the caller's vote; `true` upholds the contestation.
    ///
    /// # Errors
    /// - `NotOpen` if the contestation does not exist or is closed
    /// - `Ineligible` if the caller is a party, or lacks a required stake
    /// - `AlreadyVoted` if the caller already voted
    pub fn vote<A: AssetLedger>(
        &mut self,
        ledger: &StakeLedger<A>,
        ctx: &TxContext,
        id: ContestationId,
        vote: bool,
    ) -> Result<ModerationEvent> {
        let voter = ctx.sender;
        let contestation = self.store.get_open_mut(id)?;
        contestation.check_vote(voter)?;
        if self.require_voter_stake && !ledger.has_any_role(voter) {
            return Err(ModerationError::Ineligible { voter, id });
        }
        contestation.record_vote(voter, vote)?;

        tracing::debug!(
            id = %id,
            voter = %voter,
            vote,
            yay = contestation.yay_count,
            nay = contestation.nay_count,
            "Vote recorded"
        );
        Ok(ModerationEvent::VoteCast { id, voter, vote })
    }

    /// Settle and close an open contestation.
    ///
    /// # Errors
    /// - `NotOpen` if the contestation does not exist or is closed
    /// - `QuorumNotReached` if fewer than `min_votes` votes were cast
    /// - any settlement error; the contestation then stays open
    pub fn close<A: AssetLedger>(
        &mut self,
        ledger: &mut StakeLedger<A>,
        tx: TxId,
        id: ContestationId,
    ) -> Result<SettlementReport> {
        let before = self.store.get_open(id)?.clone();
        let votes = before.vote_count();
        if votes < self.min_votes {
            tracing::warn!(id = %id, votes, required = self.min_votes, "Close rejected: quorum not reached");
            return Err(ModerationError::QuorumNotReached {
                id,
                votes,
                required: self.min_votes,
            });
        }
        let plan = self.settlement.plan(&before)?;

        self.store
            .get_open_mut(id)?
            .mark_closed(plan.outcome, tx)?;

        let report = match self.settlement.apply(&plan, ledger) {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(id = %id, error = %err, "Settlement rejected, contestation reopened");
                self.store.restore(before)?;
                return Err(err);
            }
        };

        ledger.unlock(before.poster, Role::Poster);
        ledger.unlock(before.moderator, Role::Moderator);
        tracing::info!(
            id = %id,
            outcome = %report.outcome,
            votes,
            open = self.store.open_count(),
            "Contestation settled"
        );
        Ok(report)
    }

    #[must_use]
    pub fn contestation(&self, id: ContestationId) -> Option<&Contestation> {
        self.store.get(id)
    }

    #[must_use]
    pub fn store(&self) -> &ContestationStore {
        &self.store
    }

    /// The registered certificate server.
    #[must_use]
    pub fn server(&self) -> Address {
        self.certificates.server()
    }

    #[must_use]
    pub fn policy(&self) -> &ModerationPolicy {
        self.settlement.policy()
    }
}
