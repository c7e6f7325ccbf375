//! Escrow orchestration between the session store and the ledger.
//!
//! The coordinator gates custody calls on session facts (who is a
//! participant, what the outcome was), mirrors deposit flags back into
//! the session document, and owns the retry policy for transient ledger
//! failures. Settlement always runs off the match-mutation path so a
//! slow ledger never blocks gameplay.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::session::{MatchId, MatchOutcome, MatchSession, MatchStatus, Seat};
use crate::domain::wallet::WalletAddr;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind};
use crate::escrow::account::EscrowAccount;
use crate::escrow::ledger::{EscrowLedger, LedgerError, TxReceipt};
use crate::logging::wallet_tag;
use crate::store::SessionStore;

#[derive(Clone)]
pub struct EscrowCoordinator {
    store: Arc<dyn SessionStore>,
    ledger: Arc<dyn EscrowLedger>,
    retry_max: u32,
    retry_base: Duration,
}

impl EscrowCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        ledger: Arc<dyn EscrowLedger>,
        retry_max: u32,
        retry_base: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            retry_max: retry_max.max(1),
            retry_base,
        }
    }

    /// Open the custody account paired with a new match.
    pub async fn open(
        &self,
        match_id: &MatchId,
        creator: &WalletAddr,
        stake: u64,
    ) -> Result<(), DomainError> {
        self.with_retry("open", match_id, || {
            self.ledger.open(match_id, creator, stake)
        })
        .await?;
        Ok(())
    }

    /// Take custody of `payer`'s stake and mirror the deposit into the
    /// session document. If the match already completed, settlement is
    /// re-dispatched: funding may lag the game itself.
    pub async fn fund(
        &self,
        match_id: &MatchId,
        payer: &WalletAddr,
        amount: u64,
    ) -> Result<TxReceipt, DomainError> {
        let session = self.store.get(match_id).await?;
        let seat = session.seat_of(payer).ok_or_else(|| {
            DomainError::forbidden(
                ForbiddenKind::NotAParticipant,
                "Only match participants may deposit",
            )
        })?;

        let receipt = self
            .with_retry("deposit", match_id, || {
                self.ledger.deposit(match_id, payer, amount)
            })
            .await?;

        let session = self.mirror_deposit(match_id, seat).await?;
        if session.status == MatchStatus::Completed {
            info!(
                match_id = %match_id,
                payer = %wallet_tag(payer.as_str()),
                "deposit arrived after completion; re-dispatching settlement"
            );
            self.dispatch_settlement(&session);
        }
        Ok(receipt)
    }

    /// Pay out to the assigned winner. Authorization lives entirely in
    /// the ledger; a wrong claimant or a repeat claim surfaces as the
    /// ledger's own error.
    pub async fn claim(
        &self,
        match_id: &MatchId,
        claimant: &WalletAddr,
    ) -> Result<TxReceipt, DomainError> {
        let receipt = self
            .with_retry("claim", match_id, || self.ledger.claim(match_id, claimant))
            .await?;
        info!(
            match_id = %match_id,
            claimant = %wallet_tag(claimant.as_str()),
            amount = receipt.amount,
            "winnings claimed"
        );
        Ok(receipt)
    }

    /// Custody snapshot for the escrow status endpoint.
    pub async fn account(&self, match_id: &MatchId) -> Result<EscrowAccount, DomainError> {
        Ok(self.ledger.account(match_id).await?)
    }

    /// Run settlement in a spawned task. Failures are logged, never
    /// propagated: the match document is already terminal and a later
    /// deposit or restart can retry.
    pub fn dispatch_settlement(&self, session: &MatchSession) {
        let coordinator = self.clone();
        let session = session.clone();
        tokio::spawn(async move {
            if let Err(err) = coordinator.settle(&session).await {
                error!(
                    match_id = %session.id,
                    error = %err,
                    "settlement failed after retries"
                );
            }
        });
    }

    /// Drive custody to its terminal phase for a completed match: wins
    /// assign the winner, draws and cancellations unwind deposits.
    pub async fn settle(&self, session: &MatchSession) -> Result<(), DomainError> {
        let outcome = session.outcome.ok_or_else(|| {
            DomainError::validation_other("Settlement dispatched without an outcome")
        })?;

        match outcome {
            MatchOutcome::CreatorWon | MatchOutcome::OpponentWon => {
                let winner = session.winner_wallet().ok_or_else(|| {
                    DomainError::validation_other("Win outcome without a winner wallet")
                })?;
                match self
                    .with_retry("assign_winner", &session.id, || {
                        self.ledger.assign_winner(&session.id, winner)
                    })
                    .await
                {
                    Ok(_) => {
                        info!(
                            match_id = %session.id,
                            winner = %wallet_tag(winner.as_str()),
                            "settlement complete; escrow awaiting claim"
                        );
                        Ok(())
                    }
                    // Funding lags: the next deposit re-dispatches us.
                    Err(LedgerError::DepositsIncomplete) => {
                        info!(
                            match_id = %session.id,
                            "winner assignment deferred until escrow is fully funded"
                        );
                        Ok(())
                    }
                    Err(err) => Err(err.into()),
                }
            }
            MatchOutcome::Draw | MatchOutcome::Cancelled => {
                let receipt = self
                    .with_retry("refund", &session.id, || self.ledger.refund(&session.id))
                    .await?;
                if receipt.amount > 0 {
                    info!(
                        match_id = %session.id,
                        amount = receipt.amount,
                        "escrow unwound after draw or cancellation"
                    );
                }
                Ok(())
            }
        }
    }

    /// Reread-CAS loop writing one deposit flag into the session.
    /// Internal writers retry on version races instead of surfacing
    /// them.
    async fn mirror_deposit(
        &self,
        match_id: &MatchId,
        seat: Seat,
    ) -> Result<MatchSession, DomainError> {
        loop {
            let current = self.store.get(match_id).await?;
            let already = match seat {
                Seat::Creator => current.funding.creator_deposited,
                Seat::Opponent => current.funding.opponent_deposited,
            };
            if already {
                return Ok(current);
            }

            let mut next = current.clone();
            next.funding.mark(seat);
            match self.store.compare_and_set(current.version, next).await {
                Ok(stored) => return Ok(stored),
                Err(DomainError::Conflict(ConflictKind::StaleState, _)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    async fn with_retry<T, F, Fut>(
        &self,
        op: &'static str,
        match_id: &MatchId,
        mut call: F,
    ) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match call().await {
                Err(err) if err.is_transient() && attempt + 1 < self.retry_max => {
                    let delay = self.retry_base * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        match_id = %match_id,
                        op,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient ledger failure; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
