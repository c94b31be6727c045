//! Generation job record and its forward-only status machine.
//!
//! A job starts `processing` and makes at most one transition, to either
//! `complete` or `failed`. `data` is `None` exactly while the job is
//! `processing`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Generated text when complete, error message when failed.
    pub data: Option<String>,
    pub created_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl Job {
    /// A fresh `processing` job.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            data: None,
            created_at: chrono::Utc::now(),
            finished_at: None,
        }
    }

    /// Transition `processing -> complete`.
    pub fn complete(&mut self, text: String) -> Result<(), CoreError> {
        self.finish(JobStatus::Complete, text)
    }

    /// Transition `processing -> failed`.
    pub fn fail(&mut self, message: String) -> Result<(), CoreError> {
        self.finish(JobStatus::Failed, message)
    }

    fn finish(&mut self, status: JobStatus, data: String) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                id: self.id,
                status: self.status,
            });
        }
        self.status = status;
        self.data = Some(data);
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }
}
