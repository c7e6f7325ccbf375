//! Rock-paper-scissors engine.
//!
//! Each player commits exactly one pick. Picks stay hidden from the other
//! side until both are in (view-layer concern); the comparison is instant
//! and terminal once the second pick lands.

use serde::{Deserialize, Serialize};

use crate::domain::engine::{MoveOutcome, TerminalResult};
use crate::domain::session::Seat;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    /// rock > scissors > paper > rock
    pub fn beats(self, other: RpsChoice) -> bool {
        matches!(
            (self, other),
            (RpsChoice::Rock, RpsChoice::Scissors)
                | (RpsChoice::Scissors, RpsChoice::Paper)
                | (RpsChoice::Paper, RpsChoice::Rock)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RpsState {
    pub creator_pick: Option<RpsChoice>,
    pub opponent_pick: Option<RpsChoice>,
}

impl RpsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pick_of(&self, seat: Seat) -> Option<RpsChoice> {
        match seat {
            Seat::Creator => self.creator_pick,
            Seat::Opponent => self.opponent_pick,
        }
    }

    fn slot_mut(&mut self, seat: Seat) -> &mut Option<RpsChoice> {
        match seat {
            Seat::Creator => &mut self.creator_pick,
            Seat::Opponent => &mut self.opponent_pick,
        }
    }
}

/// Commit `actor`'s pick. Terminal once both picks are in.
pub fn apply_pick(
    state: &mut RpsState,
    actor: Seat,
    choice: RpsChoice,
) -> Result<MoveOutcome, DomainError> {
    if state.pick_of(actor).is_some() {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            "Pick already committed",
        ));
    }

    *state.slot_mut(actor) = Some(choice);

    match (state.creator_pick, state.opponent_pick) {
        (Some(c), Some(o)) => {
            let terminal = if c.beats(o) {
                TerminalResult::Win(Seat::Creator)
            } else if o.beats(c) {
                TerminalResult::Win(Seat::Opponent)
            } else {
                TerminalResult::Draw
            };
            Ok(MoveOutcome::terminal(terminal))
        }
        _ => Ok(MoveOutcome::next(actor.other())),
    }
}
