//! Notifier implementations

use async_trait::async_trait;
use tracing::info;

use crate::domain::notifier::Notifier;
use crate::domain::DomainError;

/// Notifier that logs instead of sending mail
///
/// Real outbound mail is disabled in this deployment; the verification
/// code is written to the log so operators can still complete a flow by
/// hand.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    from_address: String,
}

impl LogNotifier {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<(), DomainError> {
        info!(
            from = %self.from_address,
            to = %email,
            code,
            "mail dispatch disabled; verification code logged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier::new("onboarding@example.com");

        notifier
            .send_verification_code("a@x.com", "123456")
            .await
            .unwrap();
    }
}
