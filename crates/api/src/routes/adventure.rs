//! Route definitions for adventure generation.

use axum::routing::{get, post};
use axum::Router;

use crate::config::ServiceMode;
use crate::handlers::{adventure, status};
use crate::state::AppState;

/// Job-mode adventure routes. Empty in sync mode.
///
/// ```text
/// POST   /generate-adventure   -> submit_adventure   (202, jobId)
/// GET    /status/{job_id}      -> get_status
/// ```
pub fn router(mode: ServiceMode) -> Router<AppState> {
    match mode {
        ServiceMode::Job => Router::new()
            .route("/generate-adventure", post(adventure::submit_adventure))
            .route("/status/{job_id}", get(status::get_status)),
        ServiceMode::Sync => Router::new(),
    }
}

/// Sync-mode adventure route. Empty in job mode.
///
/// ```text
/// POST   /generate-adventure   -> generate_adventure (200, adventureText)
/// ```
pub fn sync_router(mode: ServiceMode) -> Router<AppState> {
    match mode {
        ServiceMode::Job => Router::new(),
        ServiceMode::Sync => {
            Router::new().route("/generate-adventure", post(adventure::generate_adventure))
        }
    }
}
