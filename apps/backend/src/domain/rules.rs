use crate::errors::domain::{DomainError, ValidationKind};

/// Minesweeper board edge length; the grid is square.
pub const GRID_SIZE: usize = 5;
/// Mines placed uniformly at match creation.
pub const MINE_COUNT: usize = 5;
/// Revealing all of these wins the game for the revealer.
pub const SAFE_CELLS: usize = GRID_SIZE * GRID_SIZE - MINE_COUNT;

/// Blackjack hand values above this bust.
pub const BLACKJACK_TARGET: u8 = 21;
/// Cards dealt to each player before the first action.
pub const BLACKJACK_INITIAL_HAND: usize = 2;

/// Stakes are denominated in indivisible base units and must be positive.
/// Equality of the two deposits is enforced by the escrow ledger.
pub fn validate_stake(stake: u64) -> Result<(), DomainError> {
    if stake == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidStake,
            "Stake must be a positive amount of base units",
        ));
    }
    Ok(())
}
