//! Error codes for the Stakehouse backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Stakehouse backend API.
///
/// This enum ensures type safety and prevents the use of ad-hoc error codes.
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Access denied
    Forbidden,
    /// Wallet is not a participant in the match
    NotAParticipant,
    /// Wallet is not the assigned winner
    NotWinner,
    /// Only the match creator may perform this operation
    NotCreator,

    // Request Validation
    /// Invalid match ID provided
    InvalidMatchId,
    /// Invalid wallet address
    InvalidWallet,
    /// Stake amount must be positive
    InvalidStake,
    /// Unknown game kind
    InvalidGameKind,
    /// Deposit amount does not equal the match stake
    AmountMismatch,
    /// Move submitted out of turn
    NotYourTurn,
    /// Match is not in the Playing state
    GameNotActive,
    /// Move is not legal in the current game state
    IllegalMove,
    /// Creator cannot join their own match
    SelfJoin,
    /// Move play requires both stakes to be deposited
    StakeNotFunded,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,
    /// Invalid or missing HTTP header
    InvalidHeader,

    // Resource Not Found
    /// Match not found
    MatchNotFound,
    /// Escrow account not found
    EscrowNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Match already has two players
    MatchFull,
    /// Match version mismatch; reload and retry
    StaleState,
    /// Escrow has already been claimed
    AlreadyClaimed,
    /// Wallet has already deposited its stake
    AlreadyDeposited,
    /// Escrow has already been refunded
    AlreadyRefunded,
    /// Escrow cannot settle until both deposits have landed
    EscrowNotFunded,
    /// A different winner has already been assigned
    WinnerConflict,
    /// Invite code already exists
    InviteCodeConflict,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Session store unavailable
    StoreUnavailable,
    /// Session store timeout (gateway timeout)
    StoreTimeout,
    /// Escrow ledger unavailable
    LedgerUnavailable,
    /// Data corruption detected
    DataCorruption,

    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Authorization
            Self::Forbidden => "FORBIDDEN",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",
            Self::NotWinner => "NOT_WINNER",
            Self::NotCreator => "NOT_CREATOR",

            // Request Validation
            Self::InvalidMatchId => "INVALID_MATCH_ID",
            Self::InvalidWallet => "INVALID_WALLET",
            Self::InvalidStake => "INVALID_STAKE",
            Self::InvalidGameKind => "INVALID_GAME_KIND",
            Self::AmountMismatch => "AMOUNT_MISMATCH",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::GameNotActive => "GAME_NOT_ACTIVE",
            Self::IllegalMove => "ILLEGAL_MOVE",
            Self::SelfJoin => "SELF_JOIN",
            Self::StakeNotFunded => "STAKE_NOT_FUNDED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",

            // Resource Not Found
            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::EscrowNotFound => "ESCROW_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Business Logic Conflicts
            Self::MatchFull => "MATCH_FULL",
            Self::StaleState => "STALE_STATE",
            Self::AlreadyClaimed => "ALREADY_CLAIMED",
            Self::AlreadyDeposited => "ALREADY_DEPOSITED",
            Self::AlreadyRefunded => "ALREADY_REFUNDED",
            Self::EscrowNotFunded => "ESCROW_NOT_FUNDED",
            Self::WinnerConflict => "WINNER_CONFLICT",
            Self::InviteCodeConflict => "INVITE_CODE_CONFLICT",
            Self::Conflict => "CONFLICT",

            // System Errors
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::LedgerUnavailable => "LEDGER_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",

            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
