//! In-memory workflow session store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::onboarding::{OnboardingSession, SessionStore, WorkflowInstanceId};
use crate::domain::DomainError;

/// Session store holding in-progress workflows in process memory
///
/// Sessions have no expiry; an abandoned one lives until the process
/// ends.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<WorkflowInstanceId, OnboardingSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of in-progress workflows
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: OnboardingSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(*session.id(), session);
        Ok(())
    }

    async fn get(
        &self,
        id: &WorkflowInstanceId,
    ) -> Result<Option<OnboardingSession>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn save(&self, session: &OnboardingSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn remove(&self, id: &WorkflowInstanceId) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::onboarding::WorkflowKind;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = InMemorySessionStore::new();
        let session = OnboardingSession::new(WorkflowKind::Register);
        let id = *session.id();

        store.insert(session).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.len().await, 1);

        store.remove(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = InMemorySessionStore::new();
        let mut session = OnboardingSession::new(WorkflowKind::Join);
        let id = *session.id();

        store.insert(session.clone()).await.unwrap();

        session.put_field("organization_name", "Acme");
        session.advance();
        store.save(&session).await.unwrap();

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.field("organization_name"), Some("Acme"));
        assert_eq!(fetched.next_step(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = InMemorySessionStore::new();
        let id = WorkflowInstanceId::generate();

        assert!(store.get(&id).await.unwrap().is_none());
        // Removing an unknown id is a no-op.
        store.remove(&id).await.unwrap();
    }
}
