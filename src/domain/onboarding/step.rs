//! Workflow kinds and their step registries
//!
//! Each workflow kind owns an ordered, contiguous list of step
//! definitions. Dispatch is a registry lookup: an unknown step number is
//! a lookup miss, never a default branch.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::rules::FieldRules;
use crate::domain::DomainError;

/// Session field names shared between steps, effects and finalizers
pub mod field {
    pub const EMAIL: &str = "email";
    pub const VALIDATION_KEY: &str = "validation_key";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const PASSWORD: &str = "password";
    pub const ORGANIZATION_NAME: &str = "organization_name";
    pub const DESCRIPTION: &str = "description";
}

/// The two onboarding workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// Create a new organization with its founding user
    Register,
    /// Request pending membership in an existing organization
    Join,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Join => "join",
        }
    }

    /// The ordered step definitions of this workflow
    pub fn steps(&self) -> &'static [StepDefinition] {
        match self {
            Self::Register => &REGISTER_STEPS,
            Self::Join => &JOIN_STEPS,
        }
    }

    /// Look a step up by number; `None` is the unknown-step case
    pub fn step(&self, number: u32) -> Option<&'static StepDefinition> {
        self.steps().iter().find(|s| s.number() == number)
    }

    pub fn first_step(&self) -> u32 {
        1
    }

    pub fn last_step(&self) -> u32 {
        self.steps().len() as u32
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Self::Register),
            "join" => Ok(Self::Join),
            other => Err(DomainError::not_found(format!(
                "Unknown workflow kind '{}'",
                other
            ))),
        }
    }
}

/// Cross-field or cross-entity condition a step enforces beyond its
/// static rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCheck {
    /// Submitted code equals the session-stored one
    VerificationCodeMatches,
    /// The named organization exists
    OrganizationExists,
    /// The submitted e-mail belongs to a member of the organization
    /// resolved earlier in the session
    EmailBelongsToOrganization,
    /// No organization holds the submitted name yet
    OrganizationNameAvailable,
}

/// Side effect a step runs once its validation passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    /// Generate a verification code, store it in the session and
    /// dispatch it to the submitted e-mail
    IssueVerificationCode,
}

/// One numbered stage of a workflow
#[derive(Debug, Clone)]
pub struct StepDefinition {
    number: u32,
    rules: Vec<FieldRules>,
    check: Option<StepCheck>,
    effect: Option<StepEffect>,
    /// Submitted fields merged into the session on success
    retains: &'static [&'static str],
    finalizes: bool,
}

impl StepDefinition {
    fn new(number: u32, rules: Vec<FieldRules>) -> Self {
        Self {
            number,
            rules,
            check: None,
            effect: None,
            retains: &[],
            finalizes: false,
        }
    }

    fn with_check(mut self, check: StepCheck) -> Self {
        self.check = Some(check);
        self
    }

    fn with_effect(mut self, effect: StepEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    fn retaining(mut self, retains: &'static [&'static str]) -> Self {
        self.retains = retains;
        self
    }

    fn finalizing(mut self) -> Self {
        self.finalizes = true;
        self
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn rules(&self) -> &[FieldRules] {
        &self.rules
    }

    pub fn check(&self) -> Option<StepCheck> {
        self.check
    }

    pub fn effect(&self) -> Option<StepEffect> {
        self.effect
    }

    pub fn retains(&self) -> &'static [&'static str] {
        self.retains
    }

    pub fn finalizes(&self) -> bool {
        self.finalizes
    }
}

static REGISTER_STEPS: Lazy<Vec<StepDefinition>> = Lazy::new(|| {
    vec![
        StepDefinition::new(1, vec![FieldRules::new(field::EMAIL).required().email()])
            .with_effect(StepEffect::IssueVerificationCode)
            .retaining(&[field::EMAIL]),
        StepDefinition::new(
            2,
            vec![FieldRules::new(field::VALIDATION_KEY).required()],
        )
        .with_check(StepCheck::VerificationCodeMatches),
        StepDefinition::new(
            3,
            vec![
                FieldRules::new(field::FIRST_NAME).required().max_length(15),
                FieldRules::new(field::LAST_NAME).required().max_length(15),
                FieldRules::new(field::PASSWORD)
                    .required()
                    .min_length(6)
                    .confirmed(),
            ],
        )
        .retaining(&[field::FIRST_NAME, field::LAST_NAME, field::PASSWORD]),
        StepDefinition::new(
            4,
            vec![FieldRules::new(field::ORGANIZATION_NAME).required()],
        )
        .with_check(StepCheck::OrganizationNameAvailable)
        .finalizing(),
    ]
});

static JOIN_STEPS: Lazy<Vec<StepDefinition>> = Lazy::new(|| {
    vec![
        StepDefinition::new(
            1,
            vec![FieldRules::new(field::ORGANIZATION_NAME).required()],
        )
        .with_check(StepCheck::OrganizationExists)
        .retaining(&[field::ORGANIZATION_NAME]),
        // first_name / last_name are accepted as-is on the final step.
        StepDefinition::new(
            2,
            vec![
                FieldRules::new(field::EMAIL).required().email(),
                FieldRules::new(field::PASSWORD).required().confirmed(),
            ],
        )
        .with_check(StepCheck::EmailBelongsToOrganization)
        .finalizing(),
    ]
});
