//! In-memory browser session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use chrono::Utc;
use mocksaml_core::auth::{
    is_session_expired, BrowserSession, Result, SessionId, SessionRepository,
};

/// In-memory session store.
///
/// Stores sessions in a HashMap wrapped in `Arc<RwLock<_>>`.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, BrowserSession>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    /// Expired sessions are purged on every save.
    async fn save_session(&self, session: &BrowserSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, s| !is_session_expired(s, now));
        let mut stored = session.clone();
        stored.modified = false;
        sessions.insert(session.id.as_str().to_string(), stored);
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<BrowserSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(())
    }
}
