//! Per-instance workflow session state

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::WorkflowKind;
use crate::domain::DomainError;

/// Opaque handle for one in-progress workflow
///
/// Issued when step 1 is submitted and carried by the client on every
/// later step, so two in-flight workflows can never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowInstanceId(Uuid);

impl WorkflowInstanceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for WorkflowInstanceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for WorkflowInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accumulator of validated field values across the steps of one
/// in-progress workflow
///
/// A field is only written after its owning step validated successfully,
/// so later steps can trust whatever they read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSession {
    id: WorkflowInstanceId,
    kind: WorkflowKind,
    fields: BTreeMap<String, String>,
    next_step: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OnboardingSession {
    /// Start a session at the workflow's first step
    pub fn new(kind: WorkflowKind) -> Self {
        let now = Utc::now();

        Self {
            id: WorkflowInstanceId::generate(),
            kind,
            fields: BTreeMap::new(),
            next_step: kind.first_step(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &WorkflowInstanceId {
        &self.id
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// The only step this session currently accepts
    pub fn next_step(&self) -> u32 {
        self.next_step
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn put_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
        self.touch();
    }

    /// Move on after a successful step
    pub fn advance(&mut self) {
        self.next_step += 1;
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Storage for in-progress workflow sessions
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Store a freshly created session
    async fn insert(&self, session: OnboardingSession) -> Result<(), DomainError>;

    /// Fetch a session by instance id
    async fn get(
        &self,
        id: &WorkflowInstanceId,
    ) -> Result<Option<OnboardingSession>, DomainError>;

    /// Persist a mutated session
    async fn save(&self, session: &OnboardingSession) -> Result<(), DomainError>;

    /// Drop a session (successful finalization)
    async fn remove(&self, id: &WorkflowInstanceId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_expects_first_step() {
        let session = OnboardingSession::new(WorkflowKind::Register);

        assert_eq!(session.kind(), WorkflowKind::Register);
        assert_eq!(session.next_step(), 1);
        assert!(session.fields().is_empty());
    }

    #[test]
    fn test_fields_accumulate() {
        let mut session = OnboardingSession::new(WorkflowKind::Register);

        session.put_field("email", "a@x.com");
        session.put_field("validation_key", "123456");

        assert_eq!(session.field("email"), Some("a@x.com"));
        assert_eq!(session.field("validation_key"), Some("123456"));
        assert_eq!(session.field("missing"), None);
    }

    #[test]
    fn test_advance() {
        let mut session = OnboardingSession::new(WorkflowKind::Join);

        session.advance();
        assert_eq!(session.next_step(), 2);
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = OnboardingSession::new(WorkflowKind::Register);
        let b = OnboardingSession::new(WorkflowKind::Register);

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_fields_keep_stable_order() {
        let mut session = OnboardingSession::new(WorkflowKind::Register);

        session.put_field("email", "a@x.com");
        session.put_field("first_name", "A");
        session.put_field("last_name", "B");

        let names: Vec<&String> = session.fields().keys().collect();
        assert_eq!(names, ["email", "first_name", "last_name"]);
    }
}
