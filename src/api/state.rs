//! Application state for shared services

use std::sync::Arc;

use crate::domain::onboarding::StepEngine;
use crate::domain::organization::OrganizationRepository;
use crate::domain::user::UserRepository;

/// Shared handles every handler can reach
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StepEngine>,
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
}

impl AppState {
    pub fn new(
        engine: Arc<StepEngine>,
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            engine,
            users,
            organizations,
        }
    }
}
