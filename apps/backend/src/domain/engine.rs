//! Game-agnostic move engine.
//!
//! The match coordinator never inspects game rules directly; it hands
//! an action to [`apply_move`] and reads back a [`MoveOutcome`] that
//! says either "game over, here is the result" or "game continues, here
//! is whose turn it is". Adding a game means adding a [`GameState`]
//! variant and a dispatch arm, nothing upstream changes.

use crate::domain::blackjack::{self, BlackjackState};
use crate::domain::minesweeper::{self, MinesweeperState};
use crate::domain::moves::MoveAction;
use crate::domain::rps::{self, RpsState};
use crate::domain::seed::rng_for_context;
use crate::domain::session::{GameKind, MatchOutcome, Seat};
use crate::errors::domain::{DomainError, ValidationKind};

/// How a finished game ended, in seat terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalResult {
    Win(Seat),
    Draw,
}

impl TerminalResult {
    pub fn to_outcome(self) -> MatchOutcome {
        match self {
            TerminalResult::Win(Seat::Creator) => MatchOutcome::CreatorWon,
            TerminalResult::Win(Seat::Opponent) => MatchOutcome::OpponentWon,
            TerminalResult::Draw => MatchOutcome::Draw,
        }
    }
}

/// Result of a legal move. Exactly one of the two fields is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub terminal: Option<TerminalResult>,
    pub next_turn: Option<Seat>,
}

impl MoveOutcome {
    pub fn terminal(result: TerminalResult) -> Self {
        Self {
            terminal: Some(result),
            next_turn: None,
        }
    }

    pub fn next(seat: Seat) -> Self {
        Self {
            terminal: None,
            next_turn: Some(seat),
        }
    }
}

/// Per-game state, held inside a match session. Holds hidden
/// information (mine layout, undealt deck, uncommitted picks), so it is
/// deliberately not serializable; clients only ever see the redacted
/// per-viewer projection.
#[derive(Debug, Clone)]
pub enum GameState {
    Rps(RpsState),
    Blackjack(BlackjackState),
    Minesweeper(MinesweeperState),
}

impl GameState {
    /// Build the opening state for a match, drawing any randomness
    /// (deck order, mine layout) from the match's seeded streams.
    pub fn new_for(kind: GameKind, match_seed: &[u8; 32]) -> Self {
        match kind {
            GameKind::Rps => GameState::Rps(RpsState::new()),
            GameKind::Blackjack => {
                let mut rng = rng_for_context(match_seed, "blackjack.deck");
                GameState::Blackjack(BlackjackState::deal(&mut rng))
            }
            GameKind::Minesweeper => {
                let mut rng = rng_for_context(match_seed, "minesweeper.mines");
                GameState::Minesweeper(MinesweeperState::place(&mut rng))
            }
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameState::Rps(_) => GameKind::Rps,
            GameState::Blackjack(_) => GameKind::Blackjack,
            GameState::Minesweeper(_) => GameKind::Minesweeper,
        }
    }
}

/// Every game opens on the creator's turn.
pub fn initial_turn(_kind: GameKind) -> Seat {
    Seat::Creator
}

/// Apply one action for `actor`. Turn ownership and match status are
/// enforced by the coordinator before this is called; this layer only
/// checks game-rule legality.
pub fn apply_move(
    state: &mut GameState,
    actor: Seat,
    action: &MoveAction,
) -> Result<MoveOutcome, DomainError> {
    match (state, action) {
        (GameState::Rps(rps), MoveAction::Pick { choice }) => rps::apply_pick(rps, actor, *choice),
        (GameState::Blackjack(bj), MoveAction::Hit) => blackjack::apply_hit(bj, actor),
        (GameState::Blackjack(bj), MoveAction::Stand) => blackjack::apply_stand(bj, actor),
        (GameState::Minesweeper(ms), MoveAction::Reveal { row, col }) => {
            minesweeper::apply_reveal(ms, actor, *row, *col)
        }
        (state, action) => Err(DomainError::validation(
            ValidationKind::IllegalMove,
            format!(
                "Action '{}' does not apply to {}",
                action.kind_name(),
                state.kind()
            ),
        )),
    }
}
