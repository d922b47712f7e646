use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::session::SessionState;

/// Each session is guarded by its own mutex. A handler holds the lock for the
/// full duration of an action, including any external model call, so every
/// user action is one atomic state transition.
pub type SessionHandle = Arc<Mutex<SessionState>>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self) -> AppResult<SessionHandle>;
    async fn get(&self, id: &Uuid) -> AppResult<SessionHandle>;
    async fn remove(&self, id: &Uuid) -> AppResult<()>;
    async fn count(&self) -> usize;
}

/// Sessions live in memory for their lifetime only; nothing is persisted
/// across a server restart.
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self) -> AppResult<SessionHandle> {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(SessionState::new(id)));

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, handle.clone());
        Ok(handle)
    }

    async fn get(&self, id: &Uuid) -> AppResult<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{id}' not found")))
    }

    async fn remove(&self, id: &Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{id}' not found")))
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
