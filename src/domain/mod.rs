//! Domain layer - core business logic and entities

pub mod category;
pub mod error;
pub mod notifier;
pub mod onboarding;
pub mod organization;
pub mod password;
pub mod storage;
pub mod user;

pub use category::{Category, CategoryId, CategoryRepository, NewCategory, DEFAULT_CATEGORIES};
pub use error::DomainError;
pub use notifier::Notifier;
pub use onboarding::{
    FinalizationResult, OnboardingSession, SessionStore, StepEngine, StepOutcome,
    WorkflowInstanceId, WorkflowKind,
};
pub use organization::{
    NewOrganization, Organization, OrganizationId, OrganizationRepository,
};
pub use password::PasswordHasher;
pub use storage::{OnboardingTransaction, UnitOfWork};
pub use user::{NewUser, User, UserId, UserRepository};
