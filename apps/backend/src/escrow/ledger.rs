//! Custody interface.
//!
//! The ledger owns funds and enforces escrow invariants itself; callers
//! never get to skip a check by going through a different code path.
//! Everything the coordinator knows about custody state it learns from
//! receipts and [`EscrowAccount`] reads.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::session::MatchId;
use crate::domain::wallet::WalletAddr;
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::escrow::account::EscrowAccount;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("deposit must equal the match stake: expected {expected}, got {got}")]
    AmountMismatch { expected: u64, got: u64 },
    #[error("wallet has already deposited for this match")]
    AlreadyDeposited,
    #[error("wallet is not a party to this escrow")]
    Unauthorized,
    #[error("claimant is not the assigned winner")]
    NotWinner,
    #[error("a different winner is already assigned")]
    WinnerAlreadySet,
    #[error("escrow has already been claimed")]
    AlreadyClaimed,
    #[error("both deposits are required first")]
    DepositsIncomplete,
    #[error("escrow has already been refunded")]
    AlreadyRefunded,
    #[error("no escrow account exists for this match")]
    UnknownMatch,
    #[error("ledger unavailable: {reason}")]
    Unavailable { reason: String, transient: bool },
}

impl LedgerError {
    /// True when the same call may succeed if simply repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable { transient: true, .. })
    }
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        let detail = err.to_string();
        match err {
            LedgerError::AmountMismatch { .. } => {
                DomainError::validation(ValidationKind::AmountMismatch, detail)
            }
            LedgerError::AlreadyDeposited => {
                DomainError::conflict(ConflictKind::AlreadyDeposited, detail)
            }
            LedgerError::Unauthorized => {
                DomainError::forbidden(ForbiddenKind::NotAParticipant, detail)
            }
            LedgerError::NotWinner => DomainError::forbidden(ForbiddenKind::NotWinner, detail),
            LedgerError::WinnerAlreadySet => {
                DomainError::conflict(ConflictKind::WinnerConflict, detail)
            }
            LedgerError::AlreadyClaimed => {
                DomainError::conflict(ConflictKind::AlreadyClaimed, detail)
            }
            LedgerError::DepositsIncomplete => {
                DomainError::conflict(ConflictKind::EscrowNotFunded, detail)
            }
            LedgerError::AlreadyRefunded => {
                DomainError::conflict(ConflictKind::AlreadyRefunded, detail)
            }
            LedgerError::UnknownMatch => DomainError::not_found(NotFoundKind::Escrow, detail),
            LedgerError::Unavailable { transient, .. } => {
                if transient {
                    DomainError::infra(InfraErrorKind::LedgerUnavailable, detail)
                } else {
                    DomainError::infra(InfraErrorKind::Other("LEDGER_REJECTED".into()), detail)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOp {
    Open,
    Deposit,
    AssignWinner,
    Claim,
    Refund,
}

/// Proof that a custody operation was applied. The coordinator never
/// assumes an operation happened without holding one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_id: Uuid,
    pub match_id: MatchId,
    pub op: LedgerOp,
    /// Funds moved by this operation; zero for no-op idempotent repeats.
    pub amount: u64,
}

impl TxReceipt {
    pub fn new(match_id: MatchId, op: LedgerOp, amount: u64) -> Self {
        Self {
            tx_id: Uuid::new_v4(),
            match_id,
            op,
            amount,
        }
    }
}

#[async_trait]
pub trait EscrowLedger: Send + Sync {
    /// Create the custody account for a match. Idempotent when the
    /// existing account has identical terms.
    async fn open(
        &self,
        match_id: &MatchId,
        player1: &WalletAddr,
        stake: u64,
    ) -> Result<TxReceipt, LedgerError>;

    /// Take custody of one player's stake. The first deposit from a
    /// wallet other than player1 binds that wallet as player2.
    async fn deposit(
        &self,
        match_id: &MatchId,
        payer: &WalletAddr,
        amount: u64,
    ) -> Result<TxReceipt, LedgerError>;

    /// Record the winner. Requires full funding; assigning the same
    /// winner twice is a no-op, a different winner is a conflict.
    async fn assign_winner(
        &self,
        match_id: &MatchId,
        winner: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError>;

    /// Pay the pooled stakes out to the assigned winner, exactly once.
    async fn claim(
        &self,
        match_id: &MatchId,
        claimant: &WalletAddr,
    ) -> Result<TxReceipt, LedgerError>;

    /// Return every recorded deposit to its depositor. Forbidden once a
    /// winner is assigned; repeat refunds are no-ops.
    async fn refund(&self, match_id: &MatchId) -> Result<TxReceipt, LedgerError>;

    /// Funds currently held for a match.
    async fn balance(&self, match_id: &MatchId) -> Result<u64, LedgerError>;

    /// Snapshot of the custody record.
    async fn account(&self, match_id: &MatchId) -> Result<EscrowAccount, LedgerError>;
}
