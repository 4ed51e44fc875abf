//! In-Memory Session Store Adapter
//!
//! Keeps every live conversation in a process-local map. Sessions expire
//! lazily: an idle entry past its TTL is evicted the next time anything
//! touches it, there is no background sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::dialogue::Session;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{SessionHandle, SessionStore};

/// In-memory session storage.
///
/// The map lock is held only for lookups and insertions; per-session
/// mutual exclusion lives in the handles themselves.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// Creates a store whose sessions expire after `ttl` of inactivity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn allocate(&self) -> (SessionId, SessionHandle) {
        let id = SessionId::new();
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, handle.clone());
        tracing::debug!(session = %id, "session created");
        (id, handle)
    }

    async fn evict(&self, id: SessionId) {
        self.sessions.write().await.remove(&id);
        tracing::debug!(session = %id, "expired session evicted");
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SessionHandle) {
        if let Some(id) = id {
            let existing = self.sessions.read().await.get(&id).cloned();
            if let Some(handle) = existing {
                let fresh = {
                    let mut session = handle.lock().await;
                    if session.is_expired(self.ttl, &Timestamp::now()) {
                        false
                    } else {
                        session.touch();
                        true
                    }
                };
                if fresh {
                    return (id, handle);
                }
                self.evict(id).await;
            }
        }
        self.allocate().await
    }

    async fn get(&self, id: SessionId) -> Option<Session> {
        let handle = self.sessions.read().await.get(&id).cloned()?;
        let snapshot = handle.lock().await.clone();
        if snapshot.is_expired(self.ttl, &Timestamp::now()) {
            self.evict(id).await;
            return None;
        }
        Some(snapshot)
    }

    async fn delete(&self, id: SessionId) -> bool {
        let handle = self.sessions.write().await.remove(&id);
        match handle {
            Some(handle) => {
                let session = handle.lock().await;
                !session.is_expired(self.ttl, &Timestamp::now())
            }
            None => false,
        }
    }

    async fn count(&self) -> usize {
        let handles: Vec<SessionHandle> =
            self.sessions.read().await.values().cloned().collect();
        let now = Timestamp::now();
        let mut live = 0;
        for handle in handles {
            if !handle.lock().await.is_expired(self.ttl, &now) {
                live += 1;
            }
        }
        live
    }
}
