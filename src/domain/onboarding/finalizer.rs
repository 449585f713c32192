//! Workflow finalizers
//!
//! A finalizer consumes the accumulated session plus the final step's own
//! input and commits the workflow's target entities through the unit of
//! work, all-or-nothing.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::outcome::FinalizationResult;
use super::session::OnboardingSession;
use super::step::field;
use crate::domain::category::{NewCategory, DEFAULT_CATEGORIES};
use crate::domain::organization::{NewOrganization, OrganizationRepository};
use crate::domain::password::PasswordHasher;
use crate::domain::storage::UnitOfWork;
use crate::domain::user::NewUser;
use crate::domain::DomainError;

fn session_field<'a>(
    session: &'a OnboardingSession,
    name: &str,
) -> Result<&'a str, DomainError> {
    session.field(name).ok_or_else(|| {
        DomainError::internal(format!(
            "Session {} is missing the '{}' field",
            session.id(),
            name
        ))
    })
}

fn input_field<'a>(
    input: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, DomainError> {
    input.get(name).map(String::as_str).ok_or_else(|| {
        DomainError::internal(format!("Final step input is missing the '{}' field", name))
    })
}

/// Commits a registration: one active user, one organization owned by
/// that user, and the default category set
#[derive(Debug)]
pub struct RegistrationFinalizer {
    uow: Arc<dyn UnitOfWork>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegistrationFinalizer {
    pub fn new(uow: Arc<dyn UnitOfWork>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { uow, hasher }
    }

    /// Create the founding user, the organization and its default
    /// categories as one atomic unit
    pub async fn finalize(
        &self,
        session: &OnboardingSession,
        input: &HashMap<String, String>,
    ) -> Result<FinalizationResult, DomainError> {
        let password_hash = self.hasher.hash(session_field(session, field::PASSWORD)?)?;
        let organization_name = input_field(input, field::ORGANIZATION_NAME)?;
        let description = input
            .get(field::DESCRIPTION)
            .cloned()
            .unwrap_or_default();

        let mut tx = self.uow.begin().await?;

        let user = tx
            .create_user(NewUser {
                first_name: session_field(session, field::FIRST_NAME)?.to_string(),
                last_name: session_field(session, field::LAST_NAME)?.to_string(),
                email: session_field(session, field::EMAIL)?.to_string(),
                password_hash,
                active: true,
                organization_id: None,
            })
            .await?;

        let organization = tx
            .create_organization(NewOrganization {
                name: organization_name.to_string(),
                description,
                owner_id: *user.id(),
            })
            .await?;

        tx.add_member(user.id(), organization.id()).await?;

        for name in DEFAULT_CATEGORIES {
            tx.create_category(NewCategory {
                name: name.to_string(),
                user_id: *user.id(),
                organization_id: *organization.id(),
            })
            .await?;
        }

        tx.commit().await?;

        info!(
            user_id = %user.id(),
            organization_id = %organization.id(),
            organization = %organization.name(),
            "registration finalized"
        );

        Ok(FinalizationResult {
            user_id: *user.id(),
            organization_id: Some(*organization.id()),
            message: "Organization created successfully. Now sign in to your organization!"
                .to_string(),
        })
    }
}

/// Commits a join request: one pending (inactive) member of an existing
/// organization, nothing else
#[derive(Debug)]
pub struct JoinFinalizer {
    uow: Arc<dyn UnitOfWork>,
    organizations: Arc<dyn OrganizationRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl JoinFinalizer {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        organizations: Arc<dyn OrganizationRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            uow,
            organizations,
            hasher,
        }
    }

    /// Create the pending member for the organization resolved in step 1
    pub async fn finalize(
        &self,
        session: &OnboardingSession,
        input: &HashMap<String, String>,
    ) -> Result<FinalizationResult, DomainError> {
        let organization_name = session_field(session, field::ORGANIZATION_NAME)?;

        // Resolved again at commit time; the organization may have
        // disappeared since step 1.
        let organization = self
            .organizations
            .find_by_name(organization_name)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Organization '{}' no longer exists",
                    organization_name
                ))
            })?;

        let password_hash = self.hasher.hash(input_field(input, field::PASSWORD)?)?;

        let mut tx = self.uow.begin().await?;

        let user = tx
            .create_user(NewUser {
                first_name: input.get(field::FIRST_NAME).cloned().unwrap_or_default(),
                last_name: input.get(field::LAST_NAME).cloned().unwrap_or_default(),
                email: input_field(input, field::EMAIL)?.to_string(),
                password_hash,
                active: false,
                organization_id: Some(*organization.id()),
            })
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user.id(),
            organization = %organization.name(),
            "join request finalized"
        );

        Ok(FinalizationResult {
            user_id: *user.id(),
            organization_id: None,
            message: format!(
                "A membership request for '{}' was sent to its admins. \
                 You will be notified by email.",
                organization.name()
            ),
        })
    }
}
