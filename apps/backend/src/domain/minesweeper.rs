//! Turn-based minesweeper engine.
//!
//! Players alternate revealing cells on a shared 5x5 board seeded with
//! five mines. Revealing a mine loses immediately; revealing the last
//! safe cell wins for the player who revealed it. Reveals never cascade,
//! each turn uncovers exactly one cell.

use rand_chacha::ChaCha8Rng;

use crate::domain::engine::{MoveOutcome, TerminalResult};
use crate::domain::rules::{GRID_SIZE, MINE_COUNT, SAFE_CELLS};
use crate::domain::session::Seat;
use crate::errors::domain::{DomainError, ValidationKind};

type Grid = [[bool; GRID_SIZE]; GRID_SIZE];

#[derive(Debug, Clone)]
pub struct MinesweeperState {
    /// Mine layout, hidden from both players until the game ends.
    pub mines: Grid,
    pub revealed: Grid,
    pub revealed_count: u8,
}

impl MinesweeperState {
    /// Place mines with the match's seeded stream.
    pub fn place(rng: &mut ChaCha8Rng) -> Self {
        let mut mines = [[false; GRID_SIZE]; GRID_SIZE];
        for idx in rand::seq::index::sample(rng, GRID_SIZE * GRID_SIZE, MINE_COUNT) {
            mines[idx / GRID_SIZE][idx % GRID_SIZE] = true;
        }
        Self {
            mines,
            revealed: [[false; GRID_SIZE]; GRID_SIZE],
            revealed_count: 0,
        }
    }

    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        self.revealed[row][col]
    }

    /// Mines adjacent to a cell, for rendering revealed cells.
    pub fn adjacent_mines(&self, row: usize, col: usize) -> u8 {
        let mut count = 0;
        for dr in -1i32..=1 {
            for dc in -1i32..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = row as i32 + dr;
                let c = col as i32 + dc;
                if (0..GRID_SIZE as i32).contains(&r)
                    && (0..GRID_SIZE as i32).contains(&c)
                    && self.mines[r as usize][c as usize]
                {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Reveal one cell for `actor`.
pub fn apply_reveal(
    state: &mut MinesweeperState,
    actor: Seat,
    row: usize,
    col: usize,
) -> Result<MoveOutcome, DomainError> {
    if row >= GRID_SIZE || col >= GRID_SIZE {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            format!("Cell ({row}, {col}) is outside the {GRID_SIZE}x{GRID_SIZE} board"),
        ));
    }
    if state.revealed[row][col] {
        return Err(DomainError::validation(
            ValidationKind::IllegalMove,
            format!("Cell ({row}, {col}) is already revealed"),
        ));
    }

    state.revealed[row][col] = true;
    if state.mines[row][col] {
        return Ok(MoveOutcome::terminal(TerminalResult::Win(actor.other())));
    }

    state.revealed_count += 1;
    if usize::from(state.revealed_count) == SAFE_CELLS {
        return Ok(MoveOutcome::terminal(TerminalResult::Win(actor)));
    }
    Ok(MoveOutcome::next(actor.other()))
}
