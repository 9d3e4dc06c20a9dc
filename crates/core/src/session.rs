//! Session-keyed registry of live conversations.
//!
//! Each session owns exactly one [`ConversationState`] behind its own async
//! mutex. Callers hold the per-session lock across classification and the
//! state write, so a transition is one critical section: readers observe a
//! stable pre- or post-transition snapshot, never a mix, and racing steps
//! serialize (the loser then fails the echo check with a stale turn).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dialogue::states::ConversationState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The implicit session used when a caller supplies none, so a
    /// single-conversation client never has to manage session ids.
    pub fn implicit() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::implicit()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(value)?))
    }
}

/// Exclusive handle to one session's state. Hold the lock for the whole
/// classify-then-write sequence.
pub type SessionHandle = Arc<Mutex<ConversationState>>;

pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    /// Creates the store with the implicit session already at the initial
    /// state.
    pub fn new() -> Self {
        let mut sessions = HashMap::new();
        sessions
            .insert(SessionId::implicit(), Arc::new(Mutex::new(ConversationState::initial())));
        Self { sessions: Mutex::new(sessions) }
    }

    /// Registers a fresh session at the initial state.
    pub async fn create(&self) -> (SessionId, ConversationState) {
        let id = SessionId::new();
        let state = ConversationState::initial();
        self.sessions.lock().await.insert(id, Arc::new(Mutex::new(state.clone())));
        (id, state)
    }

    /// Returns the handle for a session. The registry lock is released before
    /// the caller locks the handle, so long-running steps on one session never
    /// block lookups of another.
    pub async fn session(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Read-only copy of a session's current state.
    pub async fn snapshot(&self, id: SessionId) -> Option<ConversationState> {
        let handle = self.session(id).await?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    /// Puts an existing session back at the initial state, the only way to
    /// continue after Exit.
    pub async fn reset(&self, id: SessionId) -> Option<ConversationState> {
        let handle = self.session(id).await?;
        let mut state = handle.lock().await;
        *state = ConversationState::initial();
        Some(state.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
