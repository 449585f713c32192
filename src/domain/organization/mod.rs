//! Organization domain module

mod entity;
mod repository;
mod validation;

pub use entity::{NewOrganization, Organization, OrganizationId};
pub use repository::OrganizationRepository;
pub use validation::{
    is_slug, slugify, validate_organization_name, OrganizationValidationError,
};
