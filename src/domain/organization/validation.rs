//! Organization name validation and slug derivation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur validating an organization name
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrganizationValidationError {
    #[error("Organization name cannot be empty")]
    EmptyName,

    #[error("Organization name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Organization name must contain at least one letter or digit")]
    NoSluggableCharacters,
}

const MAX_NAME_LENGTH: usize = 100;

/// Slug shape produced by [`slugify`]: lowercase alphanumeric runs joined
/// by single hyphens
static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// Validate an organization name before it reaches the store
pub fn validate_organization_name(name: &str) -> Result<(), OrganizationValidationError> {
    if name.trim().is_empty() {
        return Err(OrganizationValidationError::EmptyName);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(OrganizationValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(OrganizationValidationError::NoSluggableCharacters);
    }

    Ok(())
}

/// Derive the URL-safe slug for an organization name
///
/// Lowercases ASCII letters and collapses every other run of characters
/// into a single hyphen. "Acme  Corp!" becomes "acme-corp".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Whether a string already has slug shape
pub fn is_slug(candidate: &str) -> bool {
    SLUG_PATTERN.is_match(candidate)
}
