//! `StakedModeration`, the single entry point hosts talk to.
//!
//! Wraps the stake ledger, the contestation engine, and the event log.
//! Every state-changing call takes a [`TxContext`], either applies fully
//! or returns an error with nothing changed, and on success yields a
//! [`TxReceipt`] whose events are also appended to the log.

use stakemod_attest::{CertificateVerifier, Secp256k1Verifier, SignatureVerifier};
use stakemod_custody::{AssetLedger, StakeLedger};
use stakemod_types::{
    Address, Amount, Contestation, ContestationId, LoggedEvent, ModerationConfig,
    ModerationEvent, Outcome, Result, Role, Settings, StakeAccount, TxContext, TxId, TxReceipt,
};

use crate::engine::{ContestationEngine, OpenRequest};
use crate::event_log::EventLog;

/// Staked moderation over an asset ledger `A`.
#[derive(Debug)]
pub struct StakedModeration<A, V = Secp256k1Verifier> {
    ledger: StakeLedger<A>,
    engine: ContestationEngine<V>,
    log: EventLog,
    next_tx: TxId,
}

impl<A: AssetLedger> StakedModeration<A> {
    /// Build from a validated config with the secp256k1 verifier.
    ///
    /// # Errors
    /// Returns `Configuration` if the config is invalid.
    pub fn new(config: &ModerationConfig, asset: A) -> Result<Self> {
        Self::with_verifier(config, asset, Secp256k1Verifier::new())
    }
}

impl<A: AssetLedger, V: SignatureVerifier> StakedModeration<A, V> {
    /// # Errors
    /// Returns `Configuration` if the config is invalid.
    pub fn with_verifier(config: &ModerationConfig, asset: A, verifier: V) -> Result<Self> {
        config.validate()?;
        let certificates = CertificateVerifier::with_verifier(config.server_address, verifier);
        tracing::info!(
            server = %config.server_address,
            poster_stake = %config.settings.poster_stake_amount,
            moderator_stake = %config.settings.moderator_stake_amount,
            fee = %config.settings.contestation_fee,
            asset = asset.symbol(),
            "Staked moderation initialised"
        );
        Ok(Self {
            ledger: StakeLedger::new(asset, config.settings),
            engine: ContestationEngine::with_verifier(certificates, config.policy),
            log: EventLog::new(),
            next_tx: TxId(0),
        })
    }

    fn commit(&mut self, events: Vec<ModerationEvent>) -> TxReceipt {
        let tx = self.next_tx;
        self.next_tx = tx.next();
        self.log.append(tx, &events);
        TxReceipt { tx, events }
    }

    // ── Stake custody ────────────────────────────────────────────────

    /// # Errors
    /// `NotBeneficiary`, `AlreadyStaked`, `WrongAmount`, or a transfer error.
    pub fn deposit_poster_stake(
        &mut self,
        ctx: &TxContext,
        beneficiary: Address,
        payment: Amount,
    ) -> Result<TxReceipt> {
        let event = self.ledger.deposit_poster_stake(ctx, beneficiary, payment)?;
        Ok(self.commit(vec![event]))
    }

    /// # Errors
    /// `NotStaked`, `StakeLocked`, or a transfer error.
    pub fn withdraw_poster_stake(&mut self, ctx: &TxContext) -> Result<TxReceipt> {
        let event = self.ledger.withdraw_poster_stake(ctx)?;
        Ok(self.commit(vec![event]))
    }

    /// # Errors
    /// `NotBeneficiary`, `AlreadyStaked`, `WrongAmount`, or a transfer error.
    pub fn deposit_moderator_stake(
        &mut self,
        ctx: &TxContext,
        beneficiary: Address,
        payment: Amount,
    ) -> Result<TxReceipt> {
        let event = self
            .ledger
            .deposit_moderator_stake(ctx, beneficiary, payment)?;
        Ok(self.commit(vec![event]))
    }

    /// # Errors
    /// `NotAModerator`, `StakeLocked`, or a transfer error.
    pub fn withdraw_moderator_stake(&mut self, ctx: &TxContext) -> Result<TxReceipt> {
        let event = self.ledger.withdraw_moderator_stake(ctx)?;
        Ok(self.commit(vec![event]))
    }

    // ── Contestations ────────────────────────────────────────────────

    /// Open a contestation as the caller (who must be a moderator).
    ///
    /// # Errors
    /// `NotAModerator`, `WrongFee`, `InvalidCertificate`, `InvalidSignature`,
    /// `AlreadyContested`, or a transfer error.
    pub fn open_contestation(
        &mut self,
        ctx: &TxContext,
        request: OpenRequest,
    ) -> Result<(ContestationId, TxReceipt)> {
        let (id, event) = self
            .engine
            .open(&mut self.ledger, ctx, self.next_tx, request)?;
        Ok((id, self.commit(vec![event])))
    }

    /// # Errors
    /// `NotOpen`, `Ineligible`, or `AlreadyVoted`.
    pub fn vote_on_contestation(
        &mut self,
        ctx: &TxContext,
        id: ContestationId,
        vote: bool,
    ) -> Result<TxReceipt> {
        let event = self.engine.vote(&self.ledger, ctx, id, vote)?;
        Ok(self.commit(vec![event]))
    }

    /// Settle an open contestation. Any caller may close once the
    /// contestation holds the policy's `min_votes`.
    ///
    /// The receipt carries exactly `[RoleRevoked, ContestationClosed]`.
    ///
    /// # Errors
    /// `NotOpen`, `QuorumNotReached`, or a settlement error (the
    /// contestation then stays open).
    pub fn close_contestation(
        &mut self,
        ctx: &TxContext,
        id: ContestationId,
    ) -> Result<(Outcome, TxReceipt)> {
        let report = self.engine.close(&mut self.ledger, self.next_tx, id)?;
        tracing::debug!(id = %id, closer = %ctx.sender, outcome = %report.outcome, "Contestation closed");
        Ok((report.outcome, self.commit(report.events)))
    }

    // ── Queries ──────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.ledger.settings()
    }

    /// Snapshot of a contestation; `None` for unknown ids.
    #[must_use]
    pub fn contestation(&self, id: ContestationId) -> Option<&Contestation> {
        self.engine.contestation(id)
    }

    #[must_use]
    pub fn contestation_count(&self) -> usize {
        self.engine.store().len()
    }

    #[must_use]
    pub fn stake(&self, address: Address, role: Role) -> StakeAccount {
        self.ledger.account(address, role)
    }

    #[must_use]
    pub fn has_role(&self, address: Address, role: Role) -> bool {
        self.ledger.has_role(address, role)
    }

    #[must_use]
    pub fn custody_balance(&self) -> Amount {
        self.ledger.custody_balance()
    }

    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.ledger.treasury_balance()
    }

    #[must_use]
    pub fn events(&self) -> &[LoggedEvent] {
        self.log.events()
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub fn asset(&self) -> &A {
        self.ledger.asset()
    }

    /// Mutable access to the asset ledger for funding and approvals.
    pub fn asset_mut(&mut self) -> &mut A {
        self.ledger.asset_mut()
    }

    #[must_use]
    pub fn server_address(&self) -> Address {
        self.engine.server()
    }
}
