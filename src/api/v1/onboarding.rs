//! Step submission endpoint
//!
//! One endpoint drives both workflows: the client POSTs a step's fields
//! and is routed to the next step, back to the same step with errors, or
//! to a terminal success notice.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::onboarding::{
    FieldErrors, StepOutcome, WorkflowInstanceId, WorkflowKind,
};
use crate::domain::DomainError;

/// One step submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSubmitRequest {
    /// Instance handle returned by step 1; absent on the first step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Uuid>,

    /// Raw field values of this step's form
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

/// Where the submission left the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Rejected,
    Advance,
    Finalized,
    NotFound,
}

/// Response for every submission outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSubmitResponse {
    pub outcome: OutcomeKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepSubmitResponse {
    fn bare(outcome: OutcomeKind) -> Self {
        Self {
            outcome,
            instance_id: None,
            next_step: None,
            errors: None,
            message: None,
        }
    }
}

/// POST /v1/onboarding/{kind}/steps/{step}
pub async fn submit_step(
    State(state): State<AppState>,
    Path((kind, step)): Path<(String, u32)>,
    Json(request): Json<StepSubmitRequest>,
) -> Response {
    let Ok(kind) = kind.parse::<WorkflowKind>() else {
        return not_found(format!("Unknown workflow kind '{}'", kind));
    };

    debug!(%kind, step, instance = ?request.instance_id, "step submitted");

    let instance = request.instance_id.map(WorkflowInstanceId::from);

    match state
        .engine
        .submit_step(kind, instance, step, request.fields)
        .await
    {
        Ok(outcome) => route_outcome(outcome),
        Err(DomainError::NotFound { message }) => not_found(message),
        Err(err) => {
            error!(%kind, step, error = %err, "step submission failed");
            ApiError::from(err).into_response()
        }
    }
}

/// Map a step outcome onto the wire: same step with errors, next step,
/// or terminal success
fn route_outcome(outcome: StepOutcome) -> Response {
    match outcome {
        StepOutcome::Rejected { errors } => {
            let response = StepSubmitResponse {
                errors: Some(errors),
                ..StepSubmitResponse::bare(OutcomeKind::Rejected)
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response()
        }
        StepOutcome::Advance {
            instance,
            next_step,
        } => {
            let response = StepSubmitResponse {
                instance_id: Some(*instance.as_uuid()),
                next_step: Some(next_step),
                ..StepSubmitResponse::bare(OutcomeKind::Advance)
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        StepOutcome::Finalized(result) => {
            let response = StepSubmitResponse {
                message: Some(result.message),
                ..StepSubmitResponse::bare(OutcomeKind::Finalized)
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
    }
}

fn not_found(message: impl Into<String>) -> Response {
    let response = StepSubmitResponse {
        message: Some(message.into()),
        ..StepSubmitResponse::bare(OutcomeKind::NotFound)
    };
    (StatusCode::NOT_FOUND, Json(response)).into_response()
}
