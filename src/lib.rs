//! Organization Onboarding API
//!
//! Multi-step, session-accumulated onboarding workflows:
//! - registering a new organization with its founding user and default
//!   categories
//! - joining an existing organization as a pending member
//!
//! Each step validates its own fields, accumulates them in a
//! per-instance session, and the final step commits the target entities
//! atomically.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::notifier::Notifier;
use domain::onboarding::{JoinFinalizer, RegistrationFinalizer, StepEngine};
use domain::organization::OrganizationRepository;
use domain::password::PasswordHasher;
use domain::storage::UnitOfWork;
use domain::user::UserRepository;
use infrastructure::{Argon2Hasher, InMemoryDirectory, InMemorySessionStore, LogNotifier};

/// Wire the in-memory directory, session store and step engine into the
/// application state
pub fn create_app_state(config: &AppConfig) -> AppState {
    let directory = Arc::new(InMemoryDirectory::new());
    let sessions = Arc::new(InMemorySessionStore::new());

    let users: Arc<dyn UserRepository> = directory.clone();
    let organizations: Arc<dyn OrganizationRepository> = directory.clone();
    let uow: Arc<dyn UnitOfWork> = directory.clone();
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let notifier: Arc<dyn Notifier> =
        Arc::new(LogNotifier::new(config.notifier.from_address.clone()));

    let registration = RegistrationFinalizer::new(uow.clone(), hasher.clone());
    let join = JoinFinalizer::new(uow, organizations.clone(), hasher);

    let engine = Arc::new(StepEngine::new(
        sessions,
        organizations.clone(),
        users.clone(),
        notifier,
        registration,
        join,
    ));

    AppState::new(engine, users, organizations)
}
