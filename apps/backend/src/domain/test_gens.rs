// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::moves::MoveAction;
use crate::domain::rps::RpsChoice;
use crate::domain::rules::GRID_SIZE;
use crate::domain::session::{GameKind, Seat};

pub fn seat() -> impl Strategy<Value = Seat> {
    prop_oneof![Just(Seat::Creator), Just(Seat::Opponent)]
}

pub fn game_kind() -> impl Strategy<Value = GameKind> {
    prop_oneof![
        Just(GameKind::Rps),
        Just(GameKind::Blackjack),
        Just(GameKind::Minesweeper),
    ]
}

pub fn rps_choice() -> impl Strategy<Value = RpsChoice> {
    prop_oneof![
        Just(RpsChoice::Rock),
        Just(RpsChoice::Paper),
        Just(RpsChoice::Scissors),
    ]
}

/// Any 32-byte match seed.
pub fn match_seed() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

/// Any in-bounds board cell.
pub fn cell() -> impl Strategy<Value = (usize, usize)> {
    (0..GRID_SIZE, 0..GRID_SIZE)
}

/// Any well-formed move, regardless of game.
pub fn move_action() -> impl Strategy<Value = MoveAction> {
    prop_oneof![
        rps_choice().prop_map(|choice| MoveAction::Pick { choice }),
        Just(MoveAction::Hit),
        Just(MoveAction::Stand),
        cell().prop_map(|(row, col)| MoveAction::Reveal { row, col }),
    ]
}
