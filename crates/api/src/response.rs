//! Response bodies of the adventure endpoints.
//!
//! Field names are camelCase on the wire (`jobId`, `adventureText`).

use questsmith_core::job::{Job, JobStatus};
use questsmith_core::types::JobId;
use serde::Serialize;

/// `202 Accepted` body of a job submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAccepted {
    pub job_id: JobId,
}

/// Snapshot of a job returned by `GET /status/{jobId}`.
///
/// `data` serializes as `null` while the job is processing.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub data: Option<String>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            status: job.status,
            data: job.data,
        }
    }
}

/// Body of a successful synchronous generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdventureResponse {
    pub adventure_text: String,
}
