//! Read-mostly directory of live sessions.
//!
//! Each session task reports its own lifecycle here. Only summaries are
//! stored, never boards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::engine::types::Color;

/// A unique ID assigned to each game session.
pub type SessionId = Uuid;

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingPeers,
    Active,
    Terminated,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::AwaitingPeers => "awaiting_peers",
            SessionState::Active => "active",
            SessionState::Terminated => "terminated",
        }
    }
}

/// What the registry knows about one session.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub id: SessionId,
    pub state: SessionState,
    /// `None` once the session has terminated.
    pub side_to_move: Option<Color>,
    pub moves_played: u32,
    pub created_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::AwaitingPeers,
            side_to_move: None,
            moves_played: 0,
            created_at: Utc::now(),
        }
    }
}

/// Directory of live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionSummary>>,
    /// Sessions that have run to completion since start-up.
    completed: AtomicU64,
}

impl SessionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a session in the `AwaitingPeers` state and return its ID.
    pub async fn register(&self) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, SessionSummary::new(id));
        debug!(session = %id, "session registered");
        id
    }

    /// Apply `f` to a session's summary, if it is still listed.
    pub async fn update<F>(&self, id: SessionId, f: F)
    where
        F: FnOnce(&mut SessionSummary),
    {
        if let Some(summary) = self.sessions.write().await.get_mut(&id) {
            f(summary);
        }
    }

    /// Drop a terminated session from the directory.
    pub async fn finish(&self, id: SessionId) {
        if self.sessions.write().await.remove(&id).is_some() {
            self.completed.fetch_add(1, Ordering::Relaxed);
            debug!(session = %id, "session removed from registry");
        }
    }

    pub async fn get(&self, id: SessionId) -> Option<SessionSummary> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// All live sessions, oldest first.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let mut all: Vec<SessionSummary> = self.sessions.read().await.values().cloned().collect();
        all.sort_by_key(|s| s.created_at);
        all
    }

    /// Number of live sessions.
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_returns_unique_ids() {
        let reg = SessionRegistry::new();
        let a = reg.register().await;
        let b = reg.register().await;
        assert_ne!(a, b);
        assert_eq!(reg.active_count().await, 2);
    }

    #[tokio::test]
    async fn new_sessions_await_peers() {
        let reg = SessionRegistry::new();
        let id = reg.register().await;
        let s = reg.get(id).await.unwrap();
        assert_eq!(s.state, SessionState::AwaitingPeers);
        assert_eq!(s.side_to_move, None);
        assert_eq!(s.moves_played, 0);
    }

    #[tokio::test]
    async fn update_changes_summary() {
        let reg = SessionRegistry::new();
        let id = reg.register().await;
        reg.update(id, |s| {
            s.state = SessionState::Active;
            s.side_to_move = Some(Color::Black);
            s.moves_played = 3;
        })
        .await;
        let s = reg.get(id).await.unwrap();
        assert_eq!(s.state, SessionState::Active);
        assert_eq!(s.side_to_move, Some(Color::Black));
        assert_eq!(s.moves_played, 3);
    }

    #[tokio::test]
    async fn finish_removes_and_counts() {
        let reg = SessionRegistry::new();
        let id = reg.register().await;
        reg.finish(id).await;
        assert!(reg.get(id).await.is_none());
        assert_eq!(reg.active_count().await, 0);
        assert_eq!(reg.completed_count(), 1);

        // Finishing twice is a no-op.
        reg.finish(id).await;
        assert_eq!(reg.completed_count(), 1);
    }

    #[tokio::test]
    async fn update_unknown_session_is_noop() {
        let reg = SessionRegistry::new();
        reg.update(Uuid::new_v4(), |s| s.moves_played = 9).await;
        assert_eq!(reg.active_count().await, 0);
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let reg = SessionRegistry::new();
        let a = reg.register().await;
        let b = reg.register().await;
        reg.update(a, |s| s.created_at = Utc::now() + chrono::Duration::seconds(10))
            .await;
        let ids: Vec<SessionId> = reg.list().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn state_strings() {
        assert_eq!(SessionState::AwaitingPeers.as_str(), "awaiting_peers");
        assert_eq!(SessionState::Active.as_str(), "active");
        assert_eq!(SessionState::Terminated.as_str(), "terminated");
    }
}
