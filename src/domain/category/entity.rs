//! Category entity

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::organization::OrganizationId;
use crate::domain::user::UserId;

/// Categories every new organization starts with, in creation order
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Engineering",
    "New Employee Onboarding",
    "Marketing",
    "Product",
    "Human Resources",
    "Sales",
];

/// Store-assigned category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CategoryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attributes for a category about to be created
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
}

/// Category entity, scoped to one organization and its creating user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    user_id: UserId,
    organization_id: OrganizationId,
    created_at: DateTime<Utc>,
}

impl Category {
    /// Materialize a category from its creation attributes
    pub fn create(id: CategoryId, new: NewCategory) -> Self {
        Self {
            id,
            name: new.name,
            user_id: new.user_id,
            organization_id: new.organization_id,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
