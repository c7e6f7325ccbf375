//! Match flow orchestration: pairing wallets into sessions, driving them
//! through the move engines, and closing them out.
//!
//! The service owns every status transition. It reads a session, applies
//! domain logic, and writes back through compare-and-set; racing writers
//! are resolved by the store, never by locks held across awaits.

mod create_join;
mod deadlines;
mod player_actions;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod tests_create_join;

pub use deadlines::DeadlineScheduler;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::escrow::EscrowCoordinator;
use crate::store::SessionStore;

pub struct MatchFlowService {
    store: Arc<dyn SessionStore>,
    escrow: EscrowCoordinator,
    deadlines: DeadlineScheduler,
    turn_timeout: Duration,
    require_funded_play: bool,
    seed_secret: [u8; 32],
}

impl MatchFlowService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        escrow: EscrowCoordinator,
        deadlines: DeadlineScheduler,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            escrow,
            deadlines,
            turn_timeout: config.turn_timeout,
            require_funded_play: config.require_funded_play,
            seed_secret: config.seed_secret,
        }
    }
}
