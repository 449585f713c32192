//! Outbound notification boundary

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Dispatches workflow notifications to a user
///
/// Delivery is fire-and-forget: callers log failures and carry on, a
/// broken mail path must never fail a workflow step.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the e-mail verification code issued by registration step 1
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), DomainError>;
}
