//! In-process session store: dashmap for live documents, a broadcast
//! channel per watched match, and a moka cache driving retention.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use moka::future::Cache;
use moka::notification::RemovalCause;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::session::{MatchId, MatchSession};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::store::{SessionStore, SessionUpdate, SessionWatch, UnsubscribeGuard};

/// Buffered writes per watcher before it starts lagging.
const SUBSCRIBER_BUFFER: usize = 32;

pub struct MemorySessionStore {
    live: Arc<DashMap<MatchId, MatchSession>>,
    channels: Arc<DashMap<MatchId, broadcast::Sender<SessionUpdate>>>,
    /// Holds only ids. Entries are reinserted on every write, so the
    /// TTL measures time since the last accepted write; expiry evicts
    /// the live document and its channel.
    retention: Cache<MatchId, ()>,
}

impl MemorySessionStore {
    pub fn new(retention_ttl: Duration) -> Self {
        let live: Arc<DashMap<MatchId, MatchSession>> = Arc::new(DashMap::new());
        let channels: Arc<DashMap<MatchId, broadcast::Sender<SessionUpdate>>> =
            Arc::new(DashMap::new());

        let live_on_expiry = Arc::clone(&live);
        let channels_on_expiry = Arc::clone(&channels);
        let retention = Cache::builder()
            .time_to_live(retention_ttl)
            .eviction_listener(move |id: Arc<MatchId>, _unit, cause| {
                // Replaced fires on every touch; only true expiry evicts.
                if cause == RemovalCause::Expired {
                    live_on_expiry.remove(&*id);
                    channels_on_expiry.remove(&*id);
                    debug!(match_id = %id, "session passed retention window");
                }
            })
            .build();

        Self {
            live,
            channels,
            retention,
        }
    }

    /// Live sessions currently held.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn publish(&self, doc: &MatchSession) {
        if let Some(sender) = self.channels.get(&doc.id) {
            // Send only fails when nobody is listening.
            let _ = sender.send(Arc::new(doc.clone()));
        }
    }

    async fn touch(&self, id: &MatchId) {
        self.retention.insert(id.clone(), ()).await;
    }

    #[cfg(test)]
    pub(crate) async fn run_retention_maintenance(&self) {
        self.retention.run_pending_tasks().await;
    }

    #[cfg(test)]
    pub(crate) fn watcher_channels(&self) -> usize {
        self.channels.len()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, doc: MatchSession) -> Result<MatchId, DomainError> {
        let id = doc.id.clone();
        match self.live.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::conflict(
                    ConflictKind::InviteCodeConflict,
                    format!("Match id {id} is already in use"),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(doc);
            }
        }
        self.touch(&id).await;
        Ok(id)
    }

    async fn get(&self, id: &MatchId) -> Result<MatchSession, DomainError> {
        self.live
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Match, format!("Match {id} not found"))
            })
    }

    async fn compare_and_set(
        &self,
        expected_version: u64,
        mut doc: MatchSession,
    ) -> Result<MatchSession, DomainError> {
        let id = doc.id.clone();
        let stored = match self.live.entry(id.clone()) {
            Entry::Vacant(_) => {
                return Err(DomainError::not_found(
                    NotFoundKind::Match,
                    format!("Match {id} not found"),
                ));
            }
            Entry::Occupied(mut slot) => {
                let live_version = slot.get().version;
                if live_version != expected_version {
                    return Err(DomainError::conflict(
                        ConflictKind::StaleState,
                        format!(
                            "Version conflict on match {id}: expected v{expected_version}, live v{live_version}"
                        ),
                    ));
                }
                doc.version = expected_version + 1;
                doc.updated_at = OffsetDateTime::now_utc();
                slot.insert(doc.clone());
                doc
            }
        };
        self.touch(&id).await;
        self.publish(&stored);
        Ok(stored)
    }

    async fn subscribe(&self, id: &MatchId) -> Result<SessionWatch, DomainError> {
        if !self.live.contains_key(id) {
            return Err(DomainError::not_found(
                NotFoundKind::Match,
                format!("Match {id} not found"),
            ));
        }

        let receiver = self
            .channels
            .entry(id.clone())
            .or_insert_with(|| broadcast::channel(SUBSCRIBER_BUFFER).0)
            .subscribe();

        let channels = Arc::clone(&self.channels);
        let watched = id.clone();
        let guard = UnsubscribeGuard::new(move || {
            // Last receiver gone: drop the channel entry so short-lived
            // matches do not accumulate senders.
            channels.remove_if(&watched, |_, sender| sender.receiver_count() == 0);
        });
        Ok(SessionWatch::new(receiver, guard))
    }
}
