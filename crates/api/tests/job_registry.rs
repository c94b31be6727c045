//! Unit tests for `JobRegistry`.
//!
//! These tests exercise the registry directly, without HTTP. They verify id
//! uniqueness, the single processing -> terminal transition, and that the
//! retention purge never touches running jobs.

use std::collections::HashSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use questsmith_api::jobs::{JobCounts, JobRegistry};
use questsmith_core::error::CoreError;
use questsmith_core::job::JobStatus;

// ---------------------------------------------------------------------------
// Test: new registry is empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_registry_is_empty() {
    let jobs = JobRegistry::new();

    assert!(jobs.is_empty().await);
    assert_eq!(jobs.counts().await, JobCounts::default());
}

// ---------------------------------------------------------------------------
// Test: create() registers a processing job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_registers_processing_job() {
    let jobs = JobRegistry::new();

    let id = jobs.create().await;
    let job = jobs.get(id).await.expect("job must exist");

    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.data, None);
    assert_eq!(job.finished_at, None);
}

// ---------------------------------------------------------------------------
// Test: ids are unique, including under concurrent creates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_creates_yield_unique_ids() {
    let jobs = Arc::new(JobRegistry::new());

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let jobs = Arc::clone(&jobs);
            tokio::spawn(async move { jobs.create().await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }

    assert_eq!(jobs.len().await, 64);
}

// ---------------------------------------------------------------------------
// Test: get() on an unknown id is None
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_unknown_id_returns_none() {
    let jobs = JobRegistry::new();
    jobs.create().await;

    assert!(jobs.get(uuid::Uuid::new_v4()).await.is_none());
}

// ---------------------------------------------------------------------------
// Test: complete() and fail() record the outcome
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_records_text() {
    let jobs = JobRegistry::new();
    let id = jobs.create().await;

    jobs.complete(id, "# Adventure".into()).await.unwrap();

    let job = jobs.get(id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.data.as_deref(), Some("# Adventure"));
    assert!(job.finished_at.is_some());
}

#[tokio::test]
async fn fail_records_message() {
    let jobs = JobRegistry::new();
    let id = jobs.create().await;

    jobs.fail(id, "Failed to generate adventure content.".into())
        .await
        .unwrap();

    let job = jobs.get(id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(
        job.data.as_deref(),
        Some("Failed to generate adventure content.")
    );
}

// ---------------------------------------------------------------------------
// Test: a finished job cannot transition again
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_transition_is_rejected_and_data_kept() {
    let jobs = JobRegistry::new();
    let id = jobs.create().await;
    jobs.complete(id, "first".into()).await.unwrap();

    let result = jobs.fail(id, "second".into()).await;
    assert_matches!(
        result,
        Err(CoreError::InvalidTransition { status: JobStatus::Complete, .. })
    );

    let result = jobs.complete(id, "third".into()).await;
    assert_matches!(result, Err(CoreError::InvalidTransition { .. }));

    let job = jobs.get(id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.data.as_deref(), Some("first"));
}

// ---------------------------------------------------------------------------
// Test: transitions on unknown ids are NotFound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_unknown_id_is_not_found() {
    let jobs = JobRegistry::new();

    let result = jobs.complete(uuid::Uuid::new_v4(), "text".into()).await;

    assert_matches!(result, Err(CoreError::NotFound { entity: "Job", .. }));
    assert!(jobs.is_empty().await);
}

// ---------------------------------------------------------------------------
// Test: counts() tallies each status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counts_tally_each_status() {
    let jobs = JobRegistry::new();
    let a = jobs.create().await;
    let b = jobs.create().await;
    jobs.create().await;

    jobs.complete(a, "done".into()).await.unwrap();
    jobs.fail(b, "nope".into()).await.unwrap();

    assert_eq!(
        jobs.counts().await,
        JobCounts {
            processing: 1,
            complete: 1,
            failed: 1,
        }
    );
}

// ---------------------------------------------------------------------------
// Test: purge removes only finished jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn purge_keeps_processing_jobs() {
    let jobs = JobRegistry::new();
    let running = jobs.create().await;
    let done = jobs.create().await;
    jobs.complete(done, "text".into()).await.unwrap();

    let purged = jobs
        .purge_finished_before(chrono::Utc::now() + chrono::Duration::hours(1))
        .await;

    assert_eq!(purged, 1);
    assert!(jobs.get(running).await.is_some());
    assert!(jobs.get(done).await.is_none());
}
