//! Password hashing boundary

use std::fmt::Debug;

use crate::domain::DomainError;

/// Hashes passwords before they reach the entity store
///
/// Raw passwords live only in workflow session state; every persisted
/// user carries a hash.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a raw password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a raw password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}
