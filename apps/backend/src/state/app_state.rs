use std::sync::Arc;

use crate::config::AppConfig;
use crate::escrow::EscrowCoordinator;
use crate::services::MatchFlowService;
use crate::store::SessionStore;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Session store; also the subscription fan-out for live updates.
    pub store: Arc<dyn SessionStore>,
    /// Escrow orchestration (funding, claims, settlement dispatch).
    pub escrow: EscrowCoordinator,
    /// Match lifecycle service.
    pub match_flow: Arc<MatchFlowService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        escrow: EscrowCoordinator,
        match_flow: Arc<MatchFlowService>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            escrow,
            match_flow,
            config,
        }
    }
}
