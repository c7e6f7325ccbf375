//! Domain-level error type used across services, the session store, and
//! the escrow layer.
//!
//! This error type is HTTP-agnostic. Handlers should return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    StoreUnavailable,
    LedgerUnavailable,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Match,
    Escrow,
    Other(String),
}

/// Domain-level conflict kinds (extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    MatchFull,
    StaleState,
    AlreadyClaimed,
    AlreadyDeposited,
    AlreadyRefunded,
    EscrowNotFunded,
    WinnerConflict,
    InviteCodeConflict,
    Other(String),
}

/// Domain-level validation kinds; each maps to a stable error code
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidStake,
    InvalidWallet,
    InvalidMatchId,
    InvalidGameKind,
    AmountMismatch,
    NotYourTurn,
    GameNotActive,
    IllegalMove,
    SelfJoin,
    StakeNotFunded,
    Other(String),
}

/// Domain-level authorization kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ForbiddenKind {
    NotAParticipant,
    NotWinner,
    NotCreator,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Caller is not allowed to perform the operation
    Forbidden(ForbiddenKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Forbidden(kind, d) => write!(f, "forbidden {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn forbidden(kind: ForbiddenKind, detail: impl Into<String>) -> Self {
        Self::Forbidden(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Validation error with no named kind; maps to the generic
    /// VALIDATION_ERROR code. Used for invariant violations that should
    /// never be reachable from well-formed requests.
    pub fn validation_other(detail: impl Into<String>) -> Self {
        Self::Validation(ValidationKind::Other("VALIDATION_ERROR".into()), detail.into())
    }

    /// True when a retry of the same operation may succeed without any
    /// state change by the caller. Used by the escrow coordinator to
    /// decide between backoff-retry and giving up.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(InfraErrorKind::Timeout, _)
                | DomainError::Infra(InfraErrorKind::StoreUnavailable, _)
                | DomainError::Infra(InfraErrorKind::LedgerUnavailable, _)
        )
    }
}
