//! Domain layer: pure game logic types and helpers.

pub mod blackjack;
pub mod engine;
pub mod minesweeper;
pub mod moves;
pub mod rps;
pub mod rules;
pub mod seed;
pub mod session;
pub mod view;
pub mod wallet;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
pub(crate) mod test_state_helpers;

// Re-exports for ergonomics
pub use engine::{GameState, MoveOutcome, TerminalResult};
pub use moves::MoveAction;
pub use session::{
    FundingMirror, GameKind, MatchId, MatchOutcome, MatchSession, MatchStatus, Seat,
};
pub use view::SessionView;
pub use wallet::WalletAddr;
