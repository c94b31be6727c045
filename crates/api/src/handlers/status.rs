use axum::extract::{Path, State};
use axum::Json;
use questsmith_core::error::CoreError;
use questsmith_core::types::JobId;

use crate::error::{AppError, AppResult};
use crate::response::JobStatusResponse;
use crate::state::AppState;

/// GET /status/{job_id}
///
/// Current snapshot of a job. Ids that were never issued (including strings
/// that are not UUIDs at all) are 404.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatusResponse>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id.clone(),
        })
    };

    let id = JobId::parse_str(&job_id).map_err(|_| not_found())?;
    let job = state.jobs.get(id).await.ok_or_else(not_found)?;

    Ok(Json(JobStatusResponse::from(job)))
}
