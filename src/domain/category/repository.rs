//! Category repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Category, NewCategory};
use crate::domain::organization::OrganizationId;
use crate::domain::DomainError;

/// Repository trait for category storage
#[async_trait]
pub trait CategoryRepository: Send + Sync + Debug {
    /// Create a single category outside any transaction
    async fn create(&self, category: NewCategory) -> Result<Category, DomainError>;

    /// All categories of one organization, oldest first
    async fn list_by_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Category>, DomainError>;

    /// Total number of categories
    async fn count(&self) -> Result<usize, DomainError>;
}
