//! Fire-and-forget generation for submitted jobs.
//!
//! Each job gets its own task that owns the job id, drives the provider to
//! completion and writes the terminal state exactly once. Provider detail is
//! logged; the job only ever stores the generic failure message.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use questsmith_core::generation::{generate_text, TextGenerator, GENERIC_FAILURE_MESSAGE};
use questsmith_core::types::JobId;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::jobs::JobRegistry;

/// Spawn the generation task for `job_id` without awaiting it.
///
/// A panic inside the provider marks the job failed instead of leaving it
/// `processing` forever.
pub fn spawn_generation(
    jobs: Arc<JobRegistry>,
    generator: Arc<dyn TextGenerator>,
    job_id: JobId,
    prompt: String,
) -> JoinHandle<()> {
    let span = tracing::info_span!("generation", %job_id, provider = generator.name());

    tokio::spawn(
        async move {
            let task = AssertUnwindSafe(run(Arc::clone(&jobs), generator, job_id, prompt));
            if task.catch_unwind().await.is_err() {
                tracing::error!("Generation task panicked");
                record(jobs.fail(job_id, GENERIC_FAILURE_MESSAGE.to_string()).await, job_id);
            }
        }
        .instrument(span),
    )
}

/// Generate the text for one job and record the outcome.
pub async fn run(
    jobs: Arc<JobRegistry>,
    generator: Arc<dyn TextGenerator>,
    job_id: JobId,
    prompt: String,
) {
    let started = Instant::now();

    let outcome = match generate_text(generator.as_ref(), &prompt).await {
        Ok(text) => {
            tracing::info!(
                chars = text.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Adventure generation complete",
            );
            jobs.complete(job_id, text).await
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Adventure generation failed",
            );
            jobs.fail(job_id, GENERIC_FAILURE_MESSAGE.to_string()).await
        }
    };

    record(outcome, job_id);
}

fn record(outcome: Result<(), questsmith_core::error::CoreError>, job_id: JobId) {
    if let Err(e) = outcome {
        tracing::warn!(%job_id, error = %e, "Could not record job outcome");
    }
}
