//! Match session container and seat/turn helpers.
//!
//! A `MatchSession` is the single document the coordinator reads, mutates,
//! and writes back through compare-and-set. Everything a request handler
//! needs to validate an action lives here; the game-specific state is the
//! embedded `GameState`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::engine::GameState;
use crate::domain::wallet::WalletAddr;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::utils::invite_code::{generate_invite_code, is_valid_invite_code};

/// Match identifier. Doubles as the invite code the creator shares, so it
/// is short, unambiguous (Crockford Base32), and drawn from the OS RNG.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchId(String);

impl MatchId {
    pub fn generate() -> Self {
        Self(generate_invite_code())
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let canonical = raw.trim().to_ascii_uppercase();
        if is_valid_invite_code(&canonical) {
            Ok(Self(canonical))
        } else {
            Err(DomainError::validation(
                ValidationKind::InvalidMatchId,
                "Match id must be 10 Crockford Base32 characters",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MatchId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MatchId> for String {
    fn from(value: MatchId) -> Self {
        value.0
    }
}

/// The two fixed seats of a head-to-head match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    Creator,
    Opponent,
}

impl Seat {
    /// The other seat (Creator ↔ Opponent).
    #[inline]
    pub fn other(self) -> Seat {
        match self {
            Seat::Creator => Seat::Opponent,
            Seat::Opponent => Seat::Creator,
        }
    }
}

/// Supported game kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Rps,
    Blackjack,
    Minesweeper,
}

impl GameKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameKind::Rps => "rps",
            GameKind::Blackjack => "blackjack",
            GameKind::Minesweeper => "minesweeper",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rps" => Ok(GameKind::Rps),
            "blackjack" => Ok(GameKind::Blackjack),
            "minesweeper" => Ok(GameKind::Minesweeper),
            other => Err(DomainError::validation(
                ValidationKind::InvalidGameKind,
                format!("Unknown game kind '{other}'"),
            )),
        }
    }
}

/// Match lifecycle. The only legal transitions are
/// Waiting → Playing (join) and Playing → Completed (terminal move,
/// resign, forfeit); Waiting → Completed occurs only through cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Playing,
    Completed,
}

/// How a completed match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    CreatorWon,
    OpponentWon,
    Draw,
    Cancelled,
}

impl MatchOutcome {
    /// The winning seat, if this outcome has one.
    pub fn winner_seat(self) -> Option<Seat> {
        match self {
            MatchOutcome::CreatorWon => Some(Seat::Creator),
            MatchOutcome::OpponentWon => Some(Seat::Opponent),
            MatchOutcome::Draw | MatchOutcome::Cancelled => None,
        }
    }

    /// Outcome for a win by `seat`.
    pub fn win_for(seat: Seat) -> Self {
        match seat {
            Seat::Creator => MatchOutcome::CreatorWon,
            Seat::Opponent => MatchOutcome::OpponentWon,
        }
    }
}

/// Read-model of escrow funding, mirrored into the session so clients can
/// render funding progress without a second fetch. The escrow ledger is
/// authoritative; this copy may lag briefly while the mirror write retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingMirror {
    pub creator_deposited: bool,
    pub opponent_deposited: bool,
}

impl FundingMirror {
    pub fn fully_funded(&self) -> bool {
        self.creator_deposited && self.opponent_deposited
    }

    pub fn mark(&mut self, seat: Seat) {
        match seat {
            Seat::Creator => self.creator_deposited = true,
            Seat::Opponent => self.opponent_deposited = true,
        }
    }
}

/// Entire match container, sufficient for every coordinator operation.
///
/// Never serialized directly: the embedded `GameState` holds information
/// that must stay hidden from one or both players (mine positions, the
/// undealt deck, unrevealed picks). API and push payloads go through
/// `domain::view`.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pub id: MatchId,
    pub game: GameKind,
    pub creator: WalletAddr,
    /// Second seat; None while Waiting.
    pub opponent: Option<WalletAddr>,
    pub status: MatchStatus,
    /// Seat expected to act; None unless Playing (and None in Playing
    /// only for an instant, between a terminal move and persist).
    pub turn: Option<Seat>,
    /// Game-specific state owned by the move engine.
    pub state: GameState,
    /// Terminal result; Some iff status == Completed.
    pub outcome: Option<MatchOutcome>,
    /// Per-player stake in base units; both players stake the same amount.
    pub stake: u64,
    pub funding: FundingMirror,
    /// When the current turn forfeits if no move arrives.
    pub turn_deadline: Option<OffsetDateTime>,
    /// Optimistic concurrency version; bumped by the store on every
    /// successful compare-and-set.
    pub version: u64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl MatchSession {
    /// Fresh session in Waiting with version 1.
    pub fn new(
        id: MatchId,
        game: GameKind,
        creator: WalletAddr,
        stake: u64,
        state: GameState,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            game,
            creator,
            opponent: None,
            status: MatchStatus::Waiting,
            turn: None,
            state,
            outcome: None,
            stake,
            funding: FundingMirror::default(),
            turn_deadline: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Which seat `wallet` occupies, if any.
    pub fn seat_of(&self, wallet: &WalletAddr) -> Option<Seat> {
        if *wallet == self.creator {
            Some(Seat::Creator)
        } else if self.opponent.as_ref() == Some(wallet) {
            Some(Seat::Opponent)
        } else {
            None
        }
    }

    /// The wallet seated at `seat`, if occupied.
    pub fn wallet_at(&self, seat: Seat) -> Option<&WalletAddr> {
        match seat {
            Seat::Creator => Some(&self.creator),
            Seat::Opponent => self.opponent.as_ref(),
        }
    }

    pub fn is_participant(&self, wallet: &WalletAddr) -> bool {
        self.seat_of(wallet).is_some()
    }

    /// The winner's wallet for a completed match with a winning outcome.
    pub fn winner_wallet(&self) -> Option<&WalletAddr> {
        self.outcome
            .and_then(MatchOutcome::winner_seat)
            .and_then(|seat| self.wallet_at(seat))
    }
}

pub fn require_opponent<'a>(
    session: &'a MatchSession,
    ctx: &'static str,
) -> Result<&'a WalletAddr, DomainError> {
    session.opponent.as_ref().ok_or_else(|| {
        DomainError::validation_other(format!("Invariant violated: opponent must be set ({ctx})"))
    })
}

pub fn require_turn(session: &MatchSession, ctx: &'static str) -> Result<Seat, DomainError> {
    session.turn.ok_or_else(|| {
        DomainError::validation_other(format!("Invariant violated: turn must be set ({ctx})"))
    })
}

pub fn require_outcome(
    session: &MatchSession,
    ctx: &'static str,
) -> Result<MatchOutcome, DomainError> {
    session.outcome.ok_or_else(|| {
        DomainError::validation_other(format!("Invariant violated: outcome must be set ({ctx})"))
    })
}
