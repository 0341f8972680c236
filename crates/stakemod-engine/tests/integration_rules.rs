//! # Dispute-rule and attack tests
//!
//! Every test here plays a caller who knows the full source and tries to
//! break a rule: contest without collateral, underpay the fee, forge or
//! replay a certificate, vote on their own dispute, vote twice, settle
//! their own dispute before anyone has voted, or pull collateral out from
//! under an open dispute.
//!
//! A rejected call must leave no trace: no event, no balance change, no
//! consumed transaction id.

use rust_decimal::Decimal;
use stakemod_attest::{Certificate, CertificateIssuer, LocalSigner, Signature, Signer};
use stakemod_custody::{AssetLedger, NativeLedger};
use stakemod_engine::{OpenRequest, StakedModeration};
use stakemod_types::*;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn ctx(who: Address) -> TxContext {
    TxContext::from_sender(who)
}

const VOTER: Address = Address([0xd1; 20]);

struct Setup {
    moderation: StakedModeration<NativeLedger>,
    server: CertificateIssuer<LocalSigner>,
    poster: LocalSigner,
    moderator: Address,
}

fn setup(policy: ModerationPolicy) -> Setup {
    let server = CertificateIssuer::new(LocalSigner::random());
    let poster = LocalSigner::random();
    let moderator = Address([0x3d; 20]);

    let mut asset = NativeLedger::new();
    asset.fund(poster.address(), dec(1000));
    asset.fund(moderator, dec(1000));
    asset.fund(VOTER, dec(1000));

    let config = ModerationConfig {
        policy,
        ..ModerationConfig::new(server.address())
    };
    let mut moderation = StakedModeration::new(&config, asset).unwrap();
    moderation
        .deposit_poster_stake(&ctx(poster.address()), poster.address(), dec(100))
        .unwrap();
    moderation
        .deposit_moderator_stake(&ctx(moderator), moderator, dec(50))
        .unwrap();

    Setup {
        moderation,
        server,
        poster,
        moderator,
    }
}

fn valid_request(s: &Setup) -> OpenRequest {
    request_for(s, b"post-1")
}

fn request_for(s: &Setup, post_ref: &[u8]) -> OpenRequest {
    let cert = Certificate::for_post(s.poster.address(), post_ref);
    let poster_signature = cert.sign_with(&s.poster);
    let issued = s.server.countersign(cert, &poster_signature).unwrap();
    OpenRequest {
        poster: s.poster.address(),
        certificate: issued.certificate.into_bytes(),
        server_signature: issued.server_signature,
        poster_signature,
        fee: dec(10),
    }
}

/// Observable state used to prove a rejected call changed nothing.
fn snapshot(m: &StakedModeration<NativeLedger>) -> (usize, usize, Decimal, Decimal) {
    (
        m.events().len(),
        m.contestation_count(),
        m.custody_balance(),
        m.treasury_balance(),
    )
}

// ═══════════════════════════════════════════════════════════════════
// Stake custody
// ═══════════════════════════════════════════════════════════════════

#[test]
fn double_deposit_fails_already_staked() {
    let mut s = setup(ModerationPolicy::default());
    let poster = s.poster.address();
    let before = snapshot(&s.moderation);

    let err = s
        .moderation
        .deposit_poster_stake(&ctx(poster), poster, dec(100))
        .unwrap_err();
    assert_eq!(
        err,
        ModerationError::AlreadyStaked {
            address: poster,
            role: Role::Poster,
        }
    );
    assert_eq!(snapshot(&s.moderation), before);
}

#[test]
fn wrong_deposit_amount_rejected() {
    let mut s = setup(ModerationPolicy::default());
    let before = snapshot(&s.moderation);

    let err = s
        .moderation
        .deposit_moderator_stake(&ctx(VOTER), VOTER, dec(49))
        .unwrap_err();
    assert_eq!(
        err,
        ModerationError::WrongAmount {
            expected: dec(50),
            actual: dec(49),
        }
    );
    assert_eq!(snapshot(&s.moderation), before);
    assert_eq!(s.moderation.asset().balance_of(VOTER), dec(1000));
}

#[test]
fn cannot_deposit_for_someone_else() {
    let mut s = setup(ModerationPolicy::default());
    let err = s
        .moderation
        .deposit_poster_stake(&ctx(VOTER), s.moderator, dec(100))
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotBeneficiary { .. }));
}

#[test]
fn withdraw_without_stake_fails() {
    let mut s = setup(ModerationPolicy::default());
    assert_eq!(
        s.moderation.withdraw_poster_stake(&ctx(VOTER)).unwrap_err(),
        ModerationError::NotStaked(VOTER)
    );
    assert_eq!(
        s.moderation
            .withdraw_moderator_stake(&ctx(VOTER))
            .unwrap_err(),
        ModerationError::NotAModerator(VOTER)
    );
}

#[test]
fn deposit_without_funds_fails() {
    let mut s = setup(ModerationPolicy::default());
    let broke = Address([0x0b; 20]);
    let err = s
        .moderation
        .deposit_poster_stake(&ctx(broke), broke, dec(100))
        .unwrap_err();
    assert!(matches!(err, ModerationError::InsufficientFunds { .. }));
    assert!(!s.moderation.has_role(broke, Role::Poster));
}

#[test]
fn parties_cannot_unstake_while_contested() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();

    let poster = s.poster.address();
    assert!(matches!(
        s.moderation.withdraw_poster_stake(&ctx(poster)).unwrap_err(),
        ModerationError::StakeLocked { open: 1, .. }
    ));
    assert!(matches!(
        s.moderation
            .withdraw_moderator_stake(&ctx(s.moderator))
            .unwrap_err(),
        ModerationError::StakeLocked { .. }
    ));

    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation.close_contestation(&ctx(VOTER), id).unwrap();
    s.moderation
        .withdraw_moderator_stake(&ctx(s.moderator))
        .unwrap();
}

// ═══════════════════════════════════════════════════════════════════
// Opening
// ═══════════════════════════════════════════════════════════════════

#[test]
fn non_moderator_cannot_open() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let before = snapshot(&s.moderation);

    let err = s
        .moderation
        .open_contestation(&ctx(VOTER), req)
        .unwrap_err();
    assert_eq!(err, ModerationError::NotAModerator(VOTER));
    assert_eq!(snapshot(&s.moderation), before);
}

#[test]
fn withdrawn_moderator_cannot_open() {
    let mut s = setup(ModerationPolicy::default());
    s.moderation
        .withdraw_moderator_stake(&ctx(s.moderator))
        .unwrap();
    let req = valid_request(&s);
    let err = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap_err();
    assert_eq!(err, ModerationError::NotAModerator(s.moderator));
}

#[test]
fn fee_must_match_exactly() {
    let mut s = setup(ModerationPolicy::default());
    for fee in [dec(9), dec(11), Decimal::ZERO] {
        let mut req = valid_request(&s);
        req.fee = fee;
        let before = snapshot(&s.moderation);
        let err = s
            .moderation
            .open_contestation(&ctx(s.moderator), req)
            .unwrap_err();
        assert_eq!(
            err,
            ModerationError::WrongFee {
                expected: dec(10),
                actual: fee,
            }
        );
        assert_eq!(snapshot(&s.moderation), before);
    }
}

#[test]
fn certificate_from_unregistered_server_rejected() {
    let mut s = setup(ModerationPolicy::default());
    let rogue = CertificateIssuer::new(LocalSigner::random());
    let cert = Certificate::for_post(s.poster.address(), b"post-1");
    let poster_signature = cert.sign_with(&s.poster);
    let issued = rogue.countersign(cert, &poster_signature).unwrap();

    let err = s
        .moderation
        .open_contestation(
            &ctx(s.moderator),
            OpenRequest {
                poster: s.poster.address(),
                certificate: issued.certificate.into_bytes(),
                server_signature: issued.server_signature,
                poster_signature,
                fee: dec(10),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ModerationError::InvalidCertificate { .. }));
}

#[test]
fn certificate_naming_another_poster_rejected() {
    let mut s = setup(ModerationPolicy::default());
    let mut req = valid_request(&s);
    req.poster = VOTER;
    let err = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap_err();
    assert!(matches!(err, ModerationError::InvalidCertificate { .. }));
}

#[test]
fn tampered_certificate_rejected() {
    let mut s = setup(ModerationPolicy::default());
    let mut req = valid_request(&s);
    if let Some(last) = req.certificate.last_mut() {
        *last ^= 0x01;
    }
    let err = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap_err();
    assert!(matches!(
        err,
        ModerationError::InvalidCertificate { .. } | ModerationError::InvalidSignature { .. }
    ));
    assert_eq!(s.moderation.contestation_count(), 0);
}

#[test]
fn malformed_signature_rejected() {
    let mut s = setup(ModerationPolicy::default());

    let mut short = valid_request(&s);
    short.server_signature = Signature::from_bytes(vec![0u8; 64]);
    assert!(matches!(
        s.moderation
            .open_contestation(&ctx(s.moderator), short)
            .unwrap_err(),
        ModerationError::InvalidSignature { .. }
    ));

    let mut bad_v = valid_request(&s);
    let mut bytes = bad_v.poster_signature.as_bytes().to_vec();
    bytes[64] = 5;
    bad_v.poster_signature = Signature::from_bytes(bytes);
    assert!(matches!(
        s.moderation
            .open_contestation(&ctx(s.moderator), bad_v)
            .unwrap_err(),
        ModerationError::InvalidSignature { .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════
// Voting
// ═══════════════════════════════════════════════════════════════════

#[test]
fn same_certificate_cannot_be_contested_twice_while_open() {
    let mut s = setup(ModerationPolicy::default());
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), valid_request(&s))
        .unwrap();

    let before = snapshot(&s.moderation);
    let err = s
        .moderation
        .open_contestation(&ctx(s.moderator), valid_request(&s))
        .unwrap_err();
    assert_eq!(err, ModerationError::AlreadyContested(id));
    assert_eq!(snapshot(&s.moderation), before);

    // A different post by the same poster is a separate dispute.
    s.moderation
        .open_contestation(&ctx(s.moderator), request_for(&s, b"post-2"))
        .unwrap();

    // Once settled, the certificate may be contested again.
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation.close_contestation(&ctx(VOTER), id).unwrap();
    let (reopened, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), valid_request(&s))
        .unwrap();
    assert_eq!(reopened, ContestationId(2));
}

#[test]
fn parties_can_never_vote() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();

    for party in [s.poster.address(), s.moderator] {
        for vote in [true, false] {
            let err = s
                .moderation
                .vote_on_contestation(&ctx(party), id, vote)
                .unwrap_err();
            assert_eq!(err, ModerationError::Ineligible { voter: party, id });
        }
    }
    let c = s.moderation.contestation(id).unwrap();
    assert_eq!(c.vote_count(), 0);
}

#[test]
fn double_vote_rejected() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();

    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    let err = s
        .moderation
        .vote_on_contestation(&ctx(VOTER), id, false)
        .unwrap_err();
    assert_eq!(err, ModerationError::AlreadyVoted { voter: VOTER, id });

    let c = s.moderation.contestation(id).unwrap();
    assert_eq!((c.yay_count, c.nay_count), (1, 0));
}

#[test]
fn voting_on_unknown_or_closed_contestation_fails() {
    let mut s = setup(ModerationPolicy::default());
    assert_eq!(
        s.moderation
            .vote_on_contestation(&ctx(VOTER), ContestationId(0), true)
            .unwrap_err(),
        ModerationError::NotOpen(ContestationId(0))
    );

    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation.close_contestation(&ctx(VOTER), id).unwrap();
    assert_eq!(
        s.moderation
            .vote_on_contestation(&ctx(Address([0xd2; 20])), id, true)
            .unwrap_err(),
        ModerationError::NotOpen(id)
    );
}

#[test]
fn staked_voter_policy_rejects_unstaked_voters() {
    let mut s = setup(ModerationPolicy {
        require_voter_stake: true,
        ..ModerationPolicy::default()
    });
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();

    assert!(matches!(
        s.moderation
            .vote_on_contestation(&ctx(VOTER), id, true)
            .unwrap_err(),
        ModerationError::Ineligible { .. }
    ));

    s.moderation
        .deposit_poster_stake(&ctx(VOTER), VOTER, dec(100))
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
}

// ═══════════════════════════════════════════════════════════════════
// Closing
// ═══════════════════════════════════════════════════════════════════

#[test]
fn parties_cannot_settle_without_votes() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    let before = snapshot(&s.moderation);
    let poster_balance = s.moderation.asset().balance_of(s.poster.address());

    for closer in [s.poster.address(), s.moderator, VOTER] {
        assert_eq!(
            s.moderation
                .close_contestation(&ctx(closer), id)
                .unwrap_err(),
            ModerationError::QuorumNotReached {
                id,
                votes: 0,
                required: 1
            }
        );
    }

    assert_eq!(snapshot(&s.moderation), before);
    assert!(s.moderation.contestation(id).unwrap().is_open());
    assert!(s.moderation.has_role(s.poster.address(), Role::Poster));
    assert!(s.moderation.has_role(s.moderator, Role::Moderator));
    assert_eq!(
        s.moderation.asset().balance_of(s.poster.address()),
        poster_balance
    );
}

#[test]
fn quorum_counts_votes_on_both_sides() {
    let mut s = setup(ModerationPolicy {
        min_votes: 2,
        ..ModerationPolicy::default()
    });
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    assert!(matches!(
        s.moderation
            .close_contestation(&ctx(s.poster.address()), id)
            .unwrap_err(),
        ModerationError::QuorumNotReached { votes: 1, required: 2, .. }
    ));

    s.moderation
        .vote_on_contestation(&ctx(Address([0xd2; 20])), id, false)
        .unwrap();
    let (outcome, _) = s
        .moderation
        .close_contestation(&ctx(s.poster.address()), id)
        .unwrap();
    assert_eq!(outcome, Outcome::ModeratorLoses);
}

#[test]
fn tie_favours_poster_by_default() {
    let mut s = setup(ModerationPolicy::default());
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(Address([0xd2; 20])), id, false)
        .unwrap();

    let (outcome, receipt) = s.moderation.close_contestation(&ctx(VOTER), id).unwrap();
    assert_eq!(outcome, Outcome::ModeratorLoses);
    assert_eq!(receipt.kinds(), vec!["ROLE_REVOKED", "CONTESTATION_CLOSED"]);
}

#[test]
fn tie_can_favour_moderator() {
    let mut s = setup(ModerationPolicy {
        tie_break: TieBreak::FavorModerator,
        ..ModerationPolicy::default()
    });
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(Address([0xd2; 20])), id, false)
        .unwrap();

    let (outcome, _) = s.moderation.close_contestation(&ctx(VOTER), id).unwrap();
    assert_eq!(outcome, Outcome::PosterLoses);
}

#[test]
fn retain_policy_keeps_forfeit_in_treasury() {
    let mut s = setup(ModerationPolicy {
        forfeit: ForfeitPolicy::Retain,
        ..ModerationPolicy::default()
    });
    let req = valid_request(&s);
    let (id, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), req)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), id, true)
        .unwrap();
    s.moderation.close_contestation(&ctx(VOTER), id).unwrap();

    // Moderator gets only the fee back; the poster's 100 stays as treasury.
    assert_eq!(s.moderation.asset().balance_of(s.moderator), dec(950));
    assert_eq!(s.moderation.treasury_balance(), dec(100));
    assert_eq!(s.moderation.custody_balance(), dec(150));
    s.moderation.asset().verify_supply().unwrap();
}

#[test]
fn poster_who_already_lost_role_forfeits_nothing_twice() {
    let mut s = setup(ModerationPolicy::default());
    let first = valid_request(&s);
    let second = request_for(&s, b"post-2");
    let (a, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), first)
        .unwrap();
    let (b, _) = s
        .moderation
        .open_contestation(&ctx(s.moderator), second)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), a, true)
        .unwrap();
    s.moderation
        .vote_on_contestation(&ctx(VOTER), b, true)
        .unwrap();

    s.moderation.close_contestation(&ctx(VOTER), a).unwrap();
    let paid_after_first = s.moderation.asset().balance_of(s.moderator);

    let (outcome, receipt) = s.moderation.close_contestation(&ctx(VOTER), b).unwrap();
    assert_eq!(outcome, Outcome::PosterLoses);
    assert_eq!(receipt.events.len(), 2);
    // Second close only returns the fee.
    assert_eq!(
        s.moderation.asset().balance_of(s.moderator),
        paid_after_first + dec(10)
    );
    s.moderation.asset().verify_supply().unwrap();
}
