pub mod adventure;
pub mod health;

use axum::Router;

use crate::config::ServiceMode;
use crate::state::AppState;

/// Build the route tree bounded by the request timeout layer.
///
/// ```text
/// /health                                          Health check
/// /generate-adventure                              Submit a job (job mode)
/// /status/{job_id}                                 Poll a job (job mode)
/// /*                                               Static assets (router fallback)
/// ```
pub fn app_routes(mode: ServiceMode) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(adventure::router(mode))
}

/// Routes whose handlers enforce their own deadline.
///
/// ```text
/// /generate-adventure                              Generate inline (sync mode)
/// ```
pub fn deadline_routes(mode: ServiceMode) -> Router<AppState> {
    adventure::sync_router(mode)
}
