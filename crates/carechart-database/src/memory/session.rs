//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use carechart_core::result::AppResult;
use carechart_entity::session::{CreateSession, Session};

use crate::traits::SessionStore;

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, data: &CreateSession) -> AppResult<Session> {
        let session = Session::from(data.clone());
        self.sessions.lock().await.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.sessions.lock().await.get(&id).cloned())
    }

    async fn terminate(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(session) if session.terminated_at.is_none() => {
                session.terminated_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn terminate_for_account(&self, account_id: i64, at: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let mut count = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.account_id == account_id && s.terminated_at.is_none())
        {
            session.terminated_at = Some(at);
            count += 1;
        }
        Ok(count)
    }

    async fn clear_password_change(&self, account_id: i64) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let mut count = 0;
        for session in sessions.values_mut().filter(|s| {
            s.account_id == account_id && s.must_change_password && s.terminated_at.is_none()
        }) {
            session.must_change_password = false;
            count += 1;
        }
        Ok(count)
    }
}
