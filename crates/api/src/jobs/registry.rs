use std::collections::hash_map::Entry;
use std::collections::HashMap;

use questsmith_core::error::CoreError;
use questsmith_core::job::{Job, JobStatus};
use questsmith_core::types::{JobId, Timestamp};
use serde::Serialize;
use tokio::sync::RwLock;

/// Number of registered jobs in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub processing: usize,
    pub complete: usize,
    pub failed: usize,
}

/// Registry of every generation job created by this process.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Records are only reachable through
/// [`create`](Self::create), [`complete`](Self::complete),
/// [`fail`](Self::fail) and [`get`](Self::get) (plus the retention sweep).
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new `processing` job and return its id.
    pub async fn create(&self) -> JobId {
        let mut jobs = self.jobs.write().await;
        loop {
            let id = JobId::new_v4();
            if let Entry::Vacant(slot) = jobs.entry(id) {
                slot.insert(Job::new(id));
                return id;
            }
        }
    }

    /// Record the generated text for a `processing` job.
    pub async fn complete(&self, id: JobId, text: String) -> Result<(), CoreError> {
        self.finish(id, |job| job.complete(text)).await
    }

    /// Record a failure message for a `processing` job.
    pub async fn fail(&self, id: JobId, message: String) -> Result<(), CoreError> {
        self.finish(id, |job| job.fail(message)).await
    }

    async fn finish(
        &self,
        id: JobId,
        transition: impl FnOnce(&mut Job) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;
        transition(job)
    }

    /// Snapshot of a job, or `None` if the id was never registered.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Return the current number of registered jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn counts(&self) -> JobCounts {
        let jobs = self.jobs.read().await;
        let mut counts = JobCounts::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Complete => counts.complete += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Remove finished jobs whose `finished_at` is at or before `cutoff`.
    ///
    /// `processing` jobs are never removed. Returns the number purged.
    pub async fn purge_finished_before(&self, cutoff: Timestamp) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.finished_at.map_or(true, |finished| finished > cutoff));
        before - jobs.len()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
