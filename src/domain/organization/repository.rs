//! Organization repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewOrganization, Organization, OrganizationId};
use crate::domain::DomainError;

/// Repository trait for organization storage
#[async_trait]
pub trait OrganizationRepository: Send + Sync + Debug {
    /// Get an organization by id
    async fn get(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError>;

    /// Create a single organization outside any transaction
    ///
    /// Fails with a conflict when the name is taken.
    async fn create(&self, organization: NewOrganization)
        -> Result<Organization, DomainError>;

    /// Look an organization up by its exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Organization>, DomainError>;

    /// Whether an organization with the exact name exists
    async fn name_exists(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_name(name).await?.is_some())
    }

    /// Total number of organizations
    async fn count(&self) -> Result<usize, DomainError>;
}
