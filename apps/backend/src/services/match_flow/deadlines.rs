//! Turn deadline enforcement.
//!
//! Every successful write that leaves a session in Playing arms a timer
//! keyed by (match id, version). When a timer fires, the sweep rereads
//! the session; if the armed version is still live, the player on turn
//! forfeits and the opponent wins. Any later write supersedes the timer,
//! so stale timers decay into no-ops instead of needing cancellation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::time::DelayQueue;
use tracing::{debug, info, warn};

use crate::domain::session::{MatchId, MatchOutcome, MatchStatus};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::escrow::EscrowCoordinator;
use crate::store::SessionStore;

#[derive(Debug)]
struct ArmedDeadline {
    match_id: MatchId,
    version: u64,
    fire_in: Duration,
}

/// Handle to the scheduler task. Cloned freely; the task exits when the
/// last handle drops.
#[derive(Clone)]
pub struct DeadlineScheduler {
    tx: mpsc::UnboundedSender<ArmedDeadline>,
}

impl DeadlineScheduler {
    pub fn spawn(store: Arc<dyn SessionStore>, escrow: EscrowCoordinator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, store, escrow));
        Self { tx }
    }

    /// Arm a forfeit timer for the session version just written.
    pub fn arm(&self, match_id: &MatchId, version: u64, fire_in: Duration) {
        let armed = ArmedDeadline {
            match_id: match_id.clone(),
            version,
            fire_in,
        };
        if self.tx.send(armed).is_err() {
            warn!(match_id = %match_id, "deadline scheduler is gone; timer dropped");
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<ArmedDeadline>,
    store: Arc<dyn SessionStore>,
    escrow: EscrowCoordinator,
) {
    let mut queue: DelayQueue<(MatchId, u64)> = DelayQueue::new();
    loop {
        tokio::select! {
            armed = rx.recv() => match armed {
                Some(armed) => {
                    debug!(
                        match_id = %armed.match_id,
                        version = armed.version,
                        fire_in_ms = armed.fire_in.as_millis() as u64,
                        "deadline armed"
                    );
                    queue.insert((armed.match_id, armed.version), armed.fire_in);
                }
                None => break,
            },
            Some(expired) = queue.next(), if !queue.is_empty() => {
                let (match_id, version) = expired.into_inner();
                if let Err(err) = forfeit_expired(store.as_ref(), &escrow, &match_id, version).await {
                    warn!(match_id = %match_id, error = %err, "forfeit sweep failed");
                }
            }
        }
    }
}

/// Forfeit the on-turn player if the armed version is still the live one.
async fn forfeit_expired(
    store: &dyn SessionStore,
    escrow: &EscrowCoordinator,
    match_id: &MatchId,
    armed_version: u64,
) -> Result<(), DomainError> {
    let session = match store.get(match_id).await {
        Ok(session) => session,
        // Already expired out of the store; nothing left to forfeit.
        Err(DomainError::NotFound(_, _)) => return Ok(()),
        Err(err) => return Err(err),
    };

    if session.version != armed_version || session.status != MatchStatus::Playing {
        debug!(
            match_id = %match_id,
            armed_version,
            live_version = session.version,
            "deadline superseded"
        );
        return Ok(());
    }
    let Some(on_turn) = session.turn else {
        return Ok(());
    };

    let winner = on_turn.other();
    let mut next = session.clone();
    next.status = MatchStatus::Completed;
    next.outcome = Some(MatchOutcome::win_for(winner));
    next.turn = None;
    next.turn_deadline = None;

    match store.compare_and_set(session.version, next).await {
        Ok(stored) => {
            info!(
                match_id = %match_id,
                forfeited = ?on_turn,
                winner = ?winner,
                "turn deadline expired; match forfeited"
            );
            escrow.dispatch_settlement(&stored);
            Ok(())
        }
        // A move landed between expiry and our write.
        Err(DomainError::Conflict(ConflictKind::StaleState, _)) => Ok(()),
        Err(err) => Err(err),
    }
}
