//! Health check endpoints for liveness/readiness probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Basic liveness: the process is up
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness: the entity directory answers queries
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    match (state.users.count().await, state.organizations.count().await) {
        (Ok(_), Ok(_)) => {
            let response = HealthResponse {
                status: HealthStatus::Healthy,
                version: env!("CARGO_PKG_VERSION").to_string(),
                message: None,
            };
            (StatusCode::OK, Json(response))
        }
        (first, second) => {
            let message = [first.err(), second.err()]
                .into_iter()
                .flatten()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");

            let response = HealthResponse {
                status: HealthStatus::Unhealthy,
                version: env!("CARGO_PKG_VERSION").to_string(),
                message: Some(message),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(response))
        }
    }
}

/// Liveness probe for orchestrators
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
