//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User, UserId};
use crate::domain::organization::OrganizationId;
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Creation during workflow finalization goes through the unit of work
/// instead so multi-entity commits stay atomic; `create` exists for
/// callers outside a finalization boundary.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by id
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Create a single user outside any transaction
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// All users holding the given e-mail (e-mail is not unique)
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DomainError>;

    /// Whether the e-mail belongs to a member of the organization
    async fn email_in_organization(
        &self,
        email: &str,
        organization_id: &OrganizationId,
    ) -> Result<bool, DomainError>;

    /// Total number of users
    async fn count(&self) -> Result<usize, DomainError>;
}
