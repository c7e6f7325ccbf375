//! Session persistence behind an async trait.
//!
//! There is one logical store per process. Services never touch the
//! backing maps directly; every mutation goes through
//! [`SessionStore::compare_and_set`], which is where the optimistic
//! version check lives.

pub mod memory;


use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::session::{MatchId, MatchSession};
use crate::errors::domain::DomainError;

pub use memory::MemorySessionStore;

/// Snapshot pushed to watchers after every accepted write.
pub type SessionUpdate = Arc<MatchSession>;

/// Calls its closure exactly once, on drop. The store hands one of
/// these out per subscription so dropping the watch is the unsubscribe.
pub struct UnsubscribeGuard(Option<Box<dyn FnOnce() + Send>>);

impl UnsubscribeGuard {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(unsubscribe)))
    }
}

impl Drop for UnsubscribeGuard {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.0.take() {
            unsubscribe();
        }
    }
}

/// Live subscription to one match's accepted writes.
///
/// Field order matters: the receiver must drop before the guard so the
/// prune logic observes the decremented receiver count.
pub struct SessionWatch {
    receiver: broadcast::Receiver<SessionUpdate>,
    _guard: UnsubscribeGuard,
}

impl std::fmt::Debug for SessionWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWatch").finish_non_exhaustive()
    }
}

impl SessionWatch {
    pub fn new(receiver: broadcast::Receiver<SessionUpdate>, guard: UnsubscribeGuard) -> Self {
        Self {
            receiver,
            _guard: guard,
        }
    }

    /// Next accepted write. `Err(Closed)` means the channel was pruned
    /// out from under us (retention expiry or a racing unsubscribe);
    /// callers should resubscribe if they still care.
    pub async fn recv(&mut self) -> Result<SessionUpdate, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<SessionUpdate, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Split for stream adapters. The guard must be kept alive for as
    /// long as the receiver is in use.
    pub fn into_parts(self) -> (broadcast::Receiver<SessionUpdate>, UnsubscribeGuard) {
        (self.receiver, self._guard)
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a fresh session under its id. Fails with an invite-code
    /// conflict when the id is already live; the caller regenerates and
    /// retries.
    async fn create(&self, doc: MatchSession) -> Result<MatchId, DomainError>;

    /// Current snapshot.
    async fn get(&self, id: &MatchId) -> Result<MatchSession, DomainError>;

    /// Write `doc` iff the live version still equals `expected_version`.
    /// On success the stored document carries `expected_version + 1` and
    /// a fresh `updated_at`, and is returned. Losers get `StaleState`
    /// and are expected to reread before retrying.
    async fn compare_and_set(
        &self,
        expected_version: u64,
        doc: MatchSession,
    ) -> Result<MatchSession, DomainError>;

    /// Watch every accepted write to one match. No replay: only writes
    /// after this call are delivered.
    async fn subscribe(&self, id: &MatchId) -> Result<SessionWatch, DomainError>;
}
