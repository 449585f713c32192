//! Step engine driving both onboarding workflows
//!
//! One submission = one engine call. The engine looks the step up in the
//! kind's registry, enforces strict ordering against the session,
//! validates, runs the step's check and side effect, and either advances
//! the session or hands the final step to its finalizer.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use super::finalizer::{JoinFinalizer, RegistrationFinalizer};
use super::outcome::StepOutcome;
use super::rules::{validate_fields, FieldErrors};
use super::session::{OnboardingSession, SessionStore, WorkflowInstanceId};
use super::step::{field, StepCheck, StepDefinition, StepEffect, WorkflowKind};
use crate::domain::notifier::Notifier;
use crate::domain::organization::OrganizationRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;

/// Generate a one-time e-mail verification code: six digits, uniform in
/// 100000..=999999
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Drives step sequencing for the register and join workflows
pub struct StepEngine {
    sessions: Arc<dyn SessionStore>,
    organizations: Arc<dyn OrganizationRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    registration: RegistrationFinalizer,
    join: JoinFinalizer,
    /// Serializes submissions per instance; two in-flight requests for
    /// one session must never interleave partial writes
    locks: tokio::sync::Mutex<HashMap<WorkflowInstanceId, Arc<tokio::sync::Mutex<()>>>>,
}

impl StepEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        organizations: Arc<dyn OrganizationRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        registration: RegistrationFinalizer,
        join: JoinFinalizer,
    ) -> Self {
        Self {
            sessions,
            organizations,
            users,
            notifier,
            registration,
            join,
            locks: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Submit one step of a workflow
    ///
    /// `instance` is `None` only for a fresh step-1 submission; every
    /// later step carries the id returned by the first. Unknown steps,
    /// instances, or kind/instance mismatches are terminal NotFound
    /// errors and never touch any session.
    pub async fn submit_step(
        &self,
        kind: WorkflowKind,
        instance: Option<WorkflowInstanceId>,
        step: u32,
        fields: HashMap<String, String>,
    ) -> Result<StepOutcome, DomainError> {
        let definition = kind.step(step).ok_or_else(|| {
            DomainError::not_found(format!("Workflow '{}' has no step {}", kind, step))
        })?;

        match instance {
            Some(id) => {
                let lock = self.instance_lock(id).await;
                let _guard = lock.lock().await;

                let session = self.sessions.get(&id).await?.filter(|s| s.kind() == kind);
                let Some(session) = session else {
                    return Err(DomainError::not_found(format!(
                        "No in-progress '{}' workflow for instance '{}'",
                        kind, id
                    )));
                };

                let outcome = self.apply(definition, session, &fields).await?;
                if matches!(outcome, StepOutcome::Finalized(_)) {
                    self.release_lock(&id).await;
                }

                Ok(outcome)
            }
            None if step == kind.first_step() => {
                // Fresh instance: nobody else can hold its id yet.
                let session = OnboardingSession::new(kind);
                self.apply(definition, session, &fields).await
            }
            None => Err(DomainError::not_found(format!(
                "Step {} of '{}' requires a workflow instance id",
                step, kind
            ))),
        }
    }

    /// Validate and run one step against its session
    async fn apply(
        &self,
        definition: &StepDefinition,
        mut session: OnboardingSession,
        fields: &HashMap<String, String>,
    ) -> Result<StepOutcome, DomainError> {
        let step = definition.number();

        if session.next_step() != step {
            return Ok(StepOutcome::rejected_field(
                "step",
                format!(
                    "Steps must be completed in order; expected step {}.",
                    session.next_step()
                ),
            ));
        }

        let errors = validate_fields(definition.rules(), fields);
        if !errors.is_empty() {
            debug!(kind = %session.kind(), step, "step rejected by field rules");
            return Ok(StepOutcome::Rejected { errors });
        }

        if let Some(check) = definition.check() {
            if let Some(errors) = self.run_check(check, &session, fields).await? {
                debug!(kind = %session.kind(), step, "step rejected by check");
                return Ok(StepOutcome::Rejected { errors });
            }
        }

        if definition.finalizes() {
            let result = match session.kind() {
                WorkflowKind::Register => self.registration.finalize(&session, fields).await?,
                WorkflowKind::Join => self.join.finalize(&session, fields).await?,
            };

            // The accumulated state is spent; a failed finalize above
            // keeps the session so the client may retry this step.
            self.sessions.remove(session.id()).await?;

            return Ok(StepOutcome::Finalized(result));
        }

        let newly_created = session.next_step() == session.kind().first_step();

        for name in definition.retains() {
            if let Some(value) = fields.get(*name) {
                session.put_field(*name, value.clone());
            }
        }

        if let Some(effect) = definition.effect() {
            self.run_effect(effect, &mut session).await;
        }

        session.advance();
        let instance = *session.id();
        let next_step = session.next_step();

        if newly_created {
            self.sessions.insert(session).await?;
        } else {
            self.sessions.save(&session).await?;
        }

        Ok(StepOutcome::Advance {
            instance,
            next_step,
        })
    }

    /// Cross-field / cross-entity step checks; `Some(errors)` rejects
    async fn run_check(
        &self,
        check: StepCheck,
        session: &OnboardingSession,
        fields: &HashMap<String, String>,
    ) -> Result<Option<FieldErrors>, DomainError> {
        match check {
            StepCheck::VerificationCodeMatches => {
                let submitted = fields
                    .get(field::VALIDATION_KEY)
                    .map(String::as_str)
                    .unwrap_or("");

                if session.field(field::VALIDATION_KEY) != Some(submitted) {
                    return Ok(Some(single_error(
                        field::VALIDATION_KEY,
                        "Validation key mismatch.",
                    )));
                }

                Ok(None)
            }
            StepCheck::OrganizationExists => {
                let name = fields
                    .get(field::ORGANIZATION_NAME)
                    .map(String::as_str)
                    .unwrap_or("");

                if self.organizations.find_by_name(name).await?.is_none() {
                    return Ok(Some(single_error(
                        field::ORGANIZATION_NAME,
                        "Specified organization does not exist.",
                    )));
                }

                Ok(None)
            }
            StepCheck::EmailBelongsToOrganization => {
                let organization_name = session
                    .field(field::ORGANIZATION_NAME)
                    .ok_or_else(|| {
                        DomainError::internal(format!(
                            "Session {} is missing the '{}' field",
                            session.id(),
                            field::ORGANIZATION_NAME
                        ))
                    })?;

                let Some(organization) =
                    self.organizations.find_by_name(organization_name).await?
                else {
                    return Ok(Some(single_error(
                        field::ORGANIZATION_NAME,
                        format!("Organization '{}' no longer exists.", organization_name),
                    )));
                };

                let email = fields.get(field::EMAIL).map(String::as_str).unwrap_or("");

                if !self
                    .users
                    .email_in_organization(email, organization.id())
                    .await?
                {
                    return Ok(Some(single_error(
                        field::EMAIL,
                        format!(
                            "The email does not belong to the '{}' organization.",
                            organization.name()
                        ),
                    )));
                }

                Ok(None)
            }
            StepCheck::OrganizationNameAvailable => {
                let name = fields
                    .get(field::ORGANIZATION_NAME)
                    .map(String::as_str)
                    .unwrap_or("");

                if self.organizations.name_exists(name).await? {
                    return Ok(Some(single_error(
                        field::ORGANIZATION_NAME,
                        "The organization name has already been taken.",
                    )));
                }

                Ok(None)
            }
        }
    }

    /// Post-validation side effects; these never fail the step
    async fn run_effect(&self, effect: StepEffect, session: &mut OnboardingSession) {
        match effect {
            StepEffect::IssueVerificationCode => {
                let code = generate_verification_code();
                session.put_field(field::VALIDATION_KEY, code.clone());

                let email = session.field(field::EMAIL).unwrap_or("").to_string();

                if let Err(error) = self.notifier.send_verification_code(&email, &code).await {
                    // Fire-and-forget: a broken mail path must not block
                    // onboarding.
                    warn!(%email, %error, "failed to dispatch verification code");
                }
            }
        }
    }

    async fn instance_lock(&self, id: WorkflowInstanceId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    async fn release_lock(&self, id: &WorkflowInstanceId) {
        let mut locks = self.locks.lock().await;
        locks.remove(id);
    }
}

fn single_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}
