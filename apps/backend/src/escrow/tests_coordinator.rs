use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::session::{GameKind, MatchId, MatchOutcome, MatchSession, MatchStatus};
use crate::domain::test_state_helpers::{
    creator_wallet, opponent_wallet, playing_session, stranger_wallet,
};
use crate::domain::wallet::WalletAddr;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, InfraErrorKind};
use crate::escrow::account::EscrowAccount;
use crate::escrow::coordinator::EscrowCoordinator;
use crate::escrow::ledger::{EscrowLedger, LedgerError, TxReceipt};
use crate::escrow::vault::VaultLedger;
use crate::store::{MemorySessionStore, SessionStore};

const STAKE: u64 = 100;
const RETENTION: Duration = Duration::from_secs(3600);

struct Harness {
    store: Arc<MemorySessionStore>,
    vault: Arc<VaultLedger>,
    coordinator: EscrowCoordinator,
}

fn harness() -> Harness {
    let store = Arc::new(MemorySessionStore::new(RETENTION));
    let vault = Arc::new(VaultLedger::new());
    let coordinator = EscrowCoordinator::new(
        store.clone(),
        vault.clone(),
        5,
        Duration::from_millis(1),
    );
    Harness {
        store,
        vault,
        coordinator,
    }
}

/// Seed a Playing session into the store with its escrow opened.
async fn seeded_match(h: &Harness) -> MatchId {
    let session = playing_session(GameKind::Rps);
    let id = session.id.clone();
    h.store.create(session).await.unwrap();
    h.coordinator
        .open(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    id
}

fn completed(mut session: MatchSession, outcome: MatchOutcome) -> MatchSession {
    session.status = MatchStatus::Completed;
    session.outcome = Some(outcome);
    session.turn = None;
    session
}

#[tokio::test]
async fn fund_mirrors_deposit_into_session() {
    let h = harness();
    let id = seeded_match(&h).await;

    let receipt = h
        .coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    assert_eq!(receipt.amount, STAKE);

    let session = h.store.get(&id).await.unwrap();
    assert!(session.funding.creator_deposited);
    assert!(!session.funding.opponent_deposited);
    assert_eq!(session.version, 2, "mirror write bumps the version");
}

#[tokio::test]
async fn fund_rejects_non_participants() {
    let h = harness();
    let id = seeded_match(&h).await;

    let err = h
        .coordinator
        .fund(&id, &stranger_wallet(), STAKE)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Forbidden(ForbiddenKind::NotAParticipant, _)
    ));
    assert_eq!(h.vault.balance(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn fund_is_at_most_once_per_wallet() {
    let h = harness();
    let id = seeded_match(&h).await;

    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    let err = h
        .coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::AlreadyDeposited, _)
    ));
    assert_eq!(h.vault.balance(&id).await.unwrap(), STAKE);
}

#[tokio::test]
async fn fund_both_sides_reaches_fully_funded() {
    let h = harness();
    let id = seeded_match(&h).await;

    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    h.coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();

    let session = h.store.get(&id).await.unwrap();
    assert!(session.funding.creator_deposited);
    assert!(session.funding.opponent_deposited);

    let account = h.coordinator.account(&id).await.unwrap();
    assert!(account.fully_funded());
    assert_eq!(account.balance, 2 * STAKE);
}

#[tokio::test]
async fn settle_assigns_the_winner_when_funded() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    h.coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();

    let session = completed(h.store.get(&id).await.unwrap(), MatchOutcome::OpponentWon);
    h.coordinator.settle(&session).await.unwrap();

    let account = h.vault.account(&id).await.unwrap();
    assert_eq!(account.winner, Some(opponent_wallet()));
    assert!(!account.claimed);
}

#[tokio::test]
async fn settle_defers_assignment_until_funded() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();

    let session = completed(h.store.get(&id).await.unwrap(), MatchOutcome::CreatorWon);
    h.coordinator.settle(&session).await.unwrap();
    assert_eq!(h.vault.account(&id).await.unwrap().winner, None);
}

#[tokio::test]
async fn late_deposit_re_dispatches_settlement() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();

    // Complete the match while the opponent's stake is still missing.
    let session = h.store.get(&id).await.unwrap();
    let version = session.version;
    let session = completed(session, MatchOutcome::CreatorWon);
    h.store.compare_and_set(version, session).await.unwrap();

    h.coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();

    let mut winner = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        winner = h.vault.account(&id).await.unwrap().winner;
        if winner.is_some() {
            break;
        }
    }
    assert_eq!(winner, Some(creator_wallet()));
}

#[tokio::test]
async fn settle_refunds_on_draw() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    h.coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();

    let session = completed(h.store.get(&id).await.unwrap(), MatchOutcome::Draw);
    h.coordinator.settle(&session).await.unwrap();

    let account = h.vault.account(&id).await.unwrap();
    assert!(account.refunded);
    assert_eq!(account.balance, 0);
}

#[tokio::test]
async fn settle_refunds_partial_deposits_on_cancellation() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();

    let session = completed(h.store.get(&id).await.unwrap(), MatchOutcome::Cancelled);
    h.coordinator.settle(&session).await.unwrap();

    let account = h.vault.account(&id).await.unwrap();
    assert!(account.refunded);
    assert_eq!(account.balance, 0);
    assert_eq!(account.phase(), crate::escrow::account::EscrowPhase::Refunded);
}

#[tokio::test]
async fn claim_pays_out_through_the_coordinator() {
    let h = harness();
    let id = seeded_match(&h).await;
    h.coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    h.coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();
    let session = completed(h.store.get(&id).await.unwrap(), MatchOutcome::CreatorWon);
    h.coordinator.settle(&session).await.unwrap();

    let receipt = h.coordinator.claim(&id, &creator_wallet()).await.unwrap();
    assert_eq!(receipt.amount, 2 * STAKE);

    let err = h
        .coordinator
        .claim(&id, &creator_wallet())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::AlreadyClaimed, _)
    ));
}

/// Ledger wrapper that fails the next `failures_left` mutating calls
/// with a transient outage, then passes through to a real vault.
struct FlakyLedger {
    inner: VaultLedger,
    failures_left: AtomicU32,
    calls: AtomicU32,
}

impl FlakyLedger {
    fn new() -> Self {
        Self {
            inner: VaultLedger::new(),
            failures_left: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    fn inject(&self, failures: u32) {
        self.failures_left.store(failures, Ordering::SeqCst);
        self.calls.store(0, Ordering::SeqCst);
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(LedgerError::Unavailable {
                reason: "injected outage".into(),
                transient: true,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EscrowLedger for FlakyLedger {
    async fn open(
        &self,
        match_id: &MatchId,
        player1: &WalletAddr,
        stake: u64,
    ) -> Result<TxReceipt, LedgerError> {
        self.gate()?;
        self.inner.open(match_id, player1, stake).await
    }

    async fn deposit(
        &self,
        match_id: &MatchId,
        payer: &WalletAddr,
        amount: u64,
    ) -> Result<TxReceipt, LedgerError> {
        self.gate()?;
        self.inner.deposit(match_id, payer, amount).await
    }

    async fn assign_winner(
        &self,
        match_id: &MatchId,
        winner: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError> {
        self.gate()?;
        self.inner.assign_winner(match_id, winner).await
    }

    async fn claim(
        &self,
        match_id: &MatchId,
        claimant: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError> {
        self.gate()?;
        self.inner.claim(match_id, claimant).await
    }

    async fn refund(&self, match_id: &MatchId) -> Result<TxReceipt, LedgerError> {
        self.gate()?;
        self.inner.refund(match_id).await
    }

    async fn balance(&self, match_id: &MatchId) -> Result<u64, LedgerError> {
        self.inner.balance(match_id).await
    }

    async fn account(&self, match_id: &MatchId) -> Result<EscrowAccount, LedgerError> {
        self.inner.account(match_id).await
    }
}

fn flaky_harness(retry_max: u32) -> (Arc<MemorySessionStore>, Arc<FlakyLedger>, EscrowCoordinator) {
    let store = Arc::new(MemorySessionStore::new(RETENTION));
    let flaky = Arc::new(FlakyLedger::new());
    let coordinator = EscrowCoordinator::new(
        store.clone(),
        flaky.clone(),
        retry_max,
        Duration::from_millis(1),
    );
    (store, flaky, coordinator)
}

#[tokio::test]
async fn transient_deposit_failures_are_retried() {
    let (store, flaky, coordinator) = flaky_harness(5);
    let session = playing_session(GameKind::Rps);
    let id = session.id.clone();
    store.create(session).await.unwrap();
    coordinator.open(&id, &creator_wallet(), STAKE).await.unwrap();

    flaky.inject(2);
    let receipt = coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap();
    assert_eq!(receipt.amount, STAKE);
    assert_eq!(flaky.calls(), 3, "two failures, then success");
}

#[tokio::test]
async fn transient_settlement_failures_are_retried() {
    let (store, flaky, coordinator) = flaky_harness(5);
    let session = playing_session(GameKind::Rps);
    let id = session.id.clone();
    store.create(session.clone()).await.unwrap();
    coordinator.open(&id, &creator_wallet(), STAKE).await.unwrap();
    coordinator.fund(&id, &creator_wallet(), STAKE).await.unwrap();
    coordinator
        .fund(&id, &opponent_wallet(), STAKE)
        .await
        .unwrap();

    flaky.inject(1);
    let done = completed(store.get(&id).await.unwrap(), MatchOutcome::CreatorWon);
    coordinator.settle(&done).await.unwrap();

    assert_eq!(flaky.calls(), 2);
    assert_eq!(
        flaky.inner.account(&id).await.unwrap().winner,
        Some(creator_wallet())
    );
}

#[tokio::test]
async fn retries_are_bounded() {
    let (store, flaky, coordinator) = flaky_harness(3);
    let session = playing_session(GameKind::Rps);
    let id = session.id.clone();
    store.create(session.clone()).await.unwrap();
    coordinator.open(&id, &creator_wallet(), STAKE).await.unwrap();

    flaky.inject(u32::MAX);
    let err = coordinator
        .fund(&id, &creator_wallet(), STAKE)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Infra(InfraErrorKind::LedgerUnavailable, _)
    ));
    assert_eq!(flaky.calls(), 3, "attempts capped at the configured max");

    let session = store.get(&id).await.unwrap();
    assert!(
        !session.funding.creator_deposited,
        "no mirror write without a ledger receipt"
    );
}

#[tokio::test]
async fn non_transient_failures_are_not_retried() {
    let (store, flaky, coordinator) = flaky_harness(5);
    let session = playing_session(GameKind::Rps);
    let id = session.id.clone();
    store.create(session).await.unwrap();
    coordinator.open(&id, &creator_wallet(), STAKE).await.unwrap();

    // Wrong amount is a terminal validation error, surfaced on the
    // first attempt.
    flaky.inject(0);
    let err = coordinator
        .fund(&id, &creator_wallet(), STAKE + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_, _)));
    assert_eq!(flaky.calls(), 1);
}
