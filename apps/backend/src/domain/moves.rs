//! Wire shape for player moves.

use serde::{Deserialize, Serialize};

use crate::domain::rps::RpsChoice;

/// One move as submitted by a player. Tagged so each game's actions
/// share a single request body:
/// `{"type": "pick", "choice": "rock"}`, `{"type": "hit"}`,
/// `{"type": "stand"}`, `{"type": "reveal", "row": 2, "col": 4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveAction {
    Pick { choice: RpsChoice },
    Hit,
    Stand,
    Reveal { row: usize, col: usize },
}

impl MoveAction {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            MoveAction::Pick { .. } => "pick",
            MoveAction::Hit => "hit",
            MoveAction::Stand => "stand",
            MoveAction::Reveal { .. } => "reveal",
        }
    }
}
