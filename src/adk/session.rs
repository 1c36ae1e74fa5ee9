// SPDX-License-Identifier: MIT

//! In-memory session storage
//!
//! Sessions live for the lifetime of the process; nothing is persisted.

use crate::adk::error::StudioError;
use crate::adk::state::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct InMemorySessionService {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with fresh state.
    ///
    /// A caller-supplied id replaces any session already stored under it;
    /// otherwise a random UUID is assigned.
    pub async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<String>,
    ) -> Session {
        let now = Utc::now();
        let session = Session {
            id: session_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            state: SessionState::new(),
            created_at: now,
            last_update_time: now,
        };

        let mut sessions = self.sessions.write().await;
        if sessions.insert(session.id.clone(), session.clone()).is_some() {
            log::info!("Replaced existing session {}", session.id);
        } else {
            log::info!("Created session {} for user {}", session.id, user_id);
        }
        session
    }

    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Replace a session's state and bump its update time
    pub async fn update_state(
        &self,
        session_id: &str,
        state: SessionState,
    ) -> Result<(), StudioError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StudioError::SessionNotFound(session_id.to_string()))?;
        session.state = state;
        session.last_update_time = Utc::now();
        Ok(())
    }

    /// Sessions for one app and user, oldest first
    pub async fn list_sessions(&self, app_name: &str, user_id: &str) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.app_name == app_name && s.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        found
    }

    pub async fn delete_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::state::StateKey;

    #[tokio::test]
    async fn test_create_and_get() {
        let service = InMemorySessionService::new();
        let session = service.create_session("app", "u1", None).await;
        assert!(!session.id.is_empty());

        let loaded = service.get_session(&session.id).await.unwrap();
        assert_eq!(loaded.user_id, "u1");
        assert_eq!(loaded.state, SessionState::new());
    }

    #[tokio::test]
    async fn test_supplied_id_is_used_and_replaced() {
        let service = InMemorySessionService::new();
        service
            .create_session("app", "u1", Some("fixed".to_string()))
            .await;

        let mut state = SessionState::new();
        state.set(StateKey::Topic, "old");
        service.update_state("fixed", state).await.unwrap();

        let fresh = service
            .create_session("app", "u1", Some("fixed".to_string()))
            .await;
        assert_eq!(fresh.id, "fixed");
        let loaded = service.get_session("fixed").await.unwrap();
        assert!(loaded.state.get(StateKey::Topic).is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_session_fails() {
        let service = InMemorySessionService::new();
        let err = service
            .update_state("missing", SessionState::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::SessionNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let service = InMemorySessionService::new();
        let a = service.create_session("app", "u1", None).await;
        service.create_session("app", "u2", None).await;
        service.create_session("other", "u1", None).await;

        let listed = service.list_sessions("app", "u1").await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a.id);

        assert!(service.delete_session(&a.id).await);
        assert!(!service.delete_session(&a.id).await);
        assert!(service.get_session(&a.id).await.is_none());
    }
}
