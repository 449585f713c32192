//! Step submission outcomes

use serde::{Deserialize, Serialize};

use super::rules::FieldErrors;
use super::session::WorkflowInstanceId;
use crate::domain::organization::OrganizationId;
use crate::domain::user::UserId;

/// What the final step of a workflow produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizationResult {
    /// The user the workflow created
    pub user_id: UserId,

    /// The organization the workflow created (register path only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,

    /// Human-readable success notice for the caller
    pub message: String,
}

/// Result of submitting one step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Validation failed; nothing changed, the same step is retried
    Rejected { errors: FieldErrors },

    /// The step succeeded; the caller proceeds with the named step
    Advance {
        instance: WorkflowInstanceId,
        next_step: u32,
    },

    /// The last step succeeded and the workflow committed its entities
    Finalized(FinalizationResult),
}

impl StepOutcome {
    /// Rejection carrying a single message on a single field
    pub fn rejected_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Rejected { errors }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_field_helper() {
        let outcome = StepOutcome::rejected_field("validation_key", "Validation key mismatch.");

        assert!(outcome.is_rejected());
        match outcome {
            StepOutcome::Rejected { errors } => {
                assert_eq!(
                    errors.get("validation_key").unwrap(),
                    &vec!["Validation key mismatch.".to_string()]
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_finalization_result_serialization() {
        let result = FinalizationResult {
            user_id: UserId::generate(),
            organization_id: None,
            message: "done".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("organization_id"));
        assert!(json.contains("\"message\":\"done\""));
    }
}
