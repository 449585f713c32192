//! Atomic unit-of-work boundary for workflow finalization
//!
//! A finalizer stages every entity it needs through one transaction and
//! commits once. Either the whole staged set becomes durable or none of
//! it does; constraint violations (a taken organization name) fail the
//! transaction and leave the store untouched.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::category::{Category, NewCategory};
use crate::domain::organization::{NewOrganization, Organization, OrganizationId};
use crate::domain::user::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Factory for onboarding transactions
#[async_trait]
pub trait UnitOfWork: Send + Sync + Debug {
    /// Begin a transaction; staged writes are discarded unless committed
    async fn begin(&self) -> Result<Box<dyn OnboardingTransaction>, DomainError>;
}

/// One in-flight multi-entity creation
///
/// Staged operations return the entity as it will exist after commit, so
/// later stages can reference earlier ids. Dropping the transaction
/// without committing discards everything.
#[async_trait]
pub trait OnboardingTransaction: Send {
    /// Stage a user creation
    async fn create_user(&mut self, user: NewUser) -> Result<User, DomainError>;

    /// Stage an organization creation; fails early when the name is
    /// already taken by a committed or staged organization
    async fn create_organization(
        &mut self,
        organization: NewOrganization,
    ) -> Result<Organization, DomainError>;

    /// Stage a category creation
    async fn create_category(&mut self, category: NewCategory) -> Result<Category, DomainError>;

    /// Stage a membership link between a staged user and organization
    async fn add_member(
        &mut self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<(), DomainError>;

    /// Apply all staged writes as one atomic unit
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Explicitly discard all staged writes
    async fn rollback(self: Box<Self>);
}
