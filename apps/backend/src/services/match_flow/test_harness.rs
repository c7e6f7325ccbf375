//! Shared builders for match flow tests.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::session::{MatchId, MatchSession};
use crate::escrow::{EscrowCoordinator, VaultLedger};
use crate::store::{MemorySessionStore, SessionStore};

use super::{DeadlineScheduler, MatchFlowService};

pub struct FlowHarness {
    pub service: MatchFlowService,
    pub store: Arc<MemorySessionStore>,
    pub vault: Arc<VaultLedger>,
    pub escrow: EscrowCoordinator,
    pub deadlines: DeadlineScheduler,
}

/// Config tuned for tests: tiny retry backoff, fixed seed secret.
pub fn test_config(turn_timeout: Duration) -> AppConfig {
    AppConfig {
        turn_timeout,
        retention: Duration::from_secs(3600),
        escrow_retry_max: 3,
        escrow_retry_base: Duration::from_millis(1),
        require_funded_play: false,
        seed_secret: [7u8; 32],
    }
}

/// Full service wired over in-process store and vault. Must run inside a
/// tokio runtime (the deadline scheduler spawns its task immediately).
pub fn flow_harness(config: &AppConfig) -> FlowHarness {
    let store = Arc::new(MemorySessionStore::new(config.retention));
    let vault = Arc::new(VaultLedger::new());
    let escrow = EscrowCoordinator::new(
        store.clone(),
        vault.clone(),
        config.escrow_retry_max,
        config.escrow_retry_base,
    );
    let deadlines = DeadlineScheduler::spawn(store.clone(), escrow.clone());
    let service = MatchFlowService::new(store.clone(), escrow.clone(), deadlines.clone(), config);
    FlowHarness {
        service,
        store,
        vault,
        escrow,
        deadlines,
    }
}

/// Poll the store until `pred` holds or a second passes.
pub async fn wait_for_session(
    store: &MemorySessionStore,
    match_id: &MatchId,
    pred: impl Fn(&MatchSession) -> bool,
) -> MatchSession {
    for _ in 0..100 {
        let session = store.get(match_id).await.unwrap();
        if pred(&session) {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {match_id} never reached the expected state");
}
