//! v1 API endpoints

pub mod onboarding;

use axum::{routing::post, Router};

use super::state::AppState;

/// Create the v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new().route(
        "/onboarding/{kind}/steps/{step}",
        post(onboarding::submit_step),
    )
}
