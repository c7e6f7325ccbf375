use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::escrow::{EscrowCoordinator, EscrowLedger, VaultLedger};
use crate::services::{DeadlineScheduler, MatchFlowService};
use crate::state::app_state::AppState;
use crate::store::{MemorySessionStore, SessionStore};

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: Option<AppConfig>,
    ledger: Option<Arc<dyn EscrowLedger>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            ledger: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the custody ledger; tests inject failure-shaped doubles.
    pub fn with_ledger(mut self, ledger: Arc<dyn EscrowLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Wire store, ledger, escrow coordination, and the deadline
    /// scheduler into one state. Must run on the runtime: the scheduler
    /// task is spawned here.
    pub async fn build(self) -> Result<AppState, AppError> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::from_env()?,
        };
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.retention));
        let ledger = self
            .ledger
            .unwrap_or_else(|| Arc::new(VaultLedger::new()));
        let escrow = EscrowCoordinator::new(
            store.clone(),
            ledger,
            config.escrow_retry_max,
            config.escrow_retry_base,
        );
        let deadlines = DeadlineScheduler::spawn(store.clone(), escrow.clone());
        let match_flow = Arc::new(MatchFlowService::new(
            store.clone(),
            escrow.clone(),
            deadlines,
            &config,
        ));
        Ok(AppState::new(store, escrow, match_flow, config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
