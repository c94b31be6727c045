//! Handlers for `POST /generate-adventure`.
//!
//! Parameters are never validated. A request without a JSON content type or
//! with an empty body is treated as an empty parameter set; a body that is
//! not a JSON object is a `400`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use futures::FutureExt;
use questsmith_core::adventure::{build_prompt, AdventureRequest};
use questsmith_core::generation::{generate_text, GenerationError};

use crate::background::generation::spawn_generation;
use crate::error::{AppError, AppResult};
use crate::response::{AdventureResponse, JobAccepted};
use crate::state::AppState;

/// Adventure parameters taken from the request body.
#[derive(Debug)]
pub struct AdventureParams(pub AdventureRequest);

impl FromRequest<AppState> for AdventureParams {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(req.headers());
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        if !is_json || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(AdventureRequest::default()));
        }

        let Json(params) = Json::<AdventureRequest>::from_bytes(&body)
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(params))
    }
}

/// `application/json` or any `application/*+json` media type.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// POST /generate-adventure (job mode)
///
/// Registers a job, starts generation in the background and returns 202
/// with the job id straight away.
pub async fn submit_adventure(
    State(state): State<AppState>,
    AdventureParams(params): AdventureParams,
) -> AppResult<impl IntoResponse> {
    let prompt = build_prompt(&params, state.config.prompt_template);
    let job_id = state.jobs.create().await;

    tracing::info!(
        %job_id,
        system = %params.system,
        genre = %params.genre,
        template = %state.config.prompt_template,
        "Adventure job submitted",
    );

    spawn_generation(
        Arc::clone(&state.jobs),
        Arc::clone(&state.generator),
        job_id,
        prompt,
    );

    Ok((StatusCode::ACCEPTED, Json(JobAccepted { job_id })))
}

/// POST /generate-adventure (sync mode)
///
/// Generates the adventure within the request and returns the full text.
/// Generation is bounded by `REQUEST_TIMEOUT_SECS`; running out of time or a
/// provider panic is reported like any other generation failure.
pub async fn generate_adventure(
    State(state): State<AppState>,
    AdventureParams(params): AdventureParams,
) -> AppResult<Json<AdventureResponse>> {
    let prompt = build_prompt(&params, state.config.prompt_template);
    let deadline = Duration::from_secs(state.config.request_timeout_secs);

    tracing::info!(
        system = %params.system,
        genre = %params.genre,
        provider = state.generator.name(),
        "Generating adventure",
    );

    let generation =
        AssertUnwindSafe(generate_text(state.generator.as_ref(), &prompt)).catch_unwind();

    let adventure_text = match tokio::time::timeout(deadline, generation).await {
        Ok(Ok(result)) => result?,
        Ok(Err(_panic)) => return Err(GenerationError::Panicked.into()),
        Err(_elapsed) => return Err(GenerationError::TimedOut(deadline).into()),
    };

    Ok(Json(AdventureResponse { adventure_text }))
}
