//! Session Store Port - Keyed, time-bounded conversation state.
//!
//! The store owns all sessions and hands out per-session handles. A handle
//! is a shared mutex around the session; the dialogue engine locks it for
//! the duration of one turn, so concurrent turns against the same session
//! identifier serialize instead of interleaving partial writes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::dialogue::Session;
use crate::domain::foundation::SessionId;

/// Shared, lockable reference to one live session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Port for session storage.
///
/// Expiry is evaluated lazily on access: an idle session past its TTL is
/// dropped and treated as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `id` when present and not expired;
    /// otherwise allocates a fresh session under a newly generated
    /// identifier. Access refreshes the session's activity timestamp.
    async fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SessionHandle);

    /// Returns a snapshot of the session, or `None` when absent or
    /// expired.
    async fn get(&self, id: SessionId) -> Option<Session>;

    /// Removes a session. Returns false when it was absent or expired.
    async fn delete(&self, id: SessionId) -> bool;

    /// Number of live (unexpired) sessions.
    async fn count(&self) -> usize;
}
