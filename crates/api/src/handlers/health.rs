use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::jobs::JobCounts;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    mode: &'static str,
    jobs: JobCounts,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.config.mode.as_str(),
        jobs: state.jobs.counts().await,
    })
}
