//! Periodic cleanup of finished jobs.
//!
//! Only runs when `JOB_RETENTION_SECS` is configured; without it the job
//! registry keeps every job for the lifetime of the process. Jobs still
//! `processing` are never touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::jobs::JobRegistry;

/// Run the job retention loop until `cancel` is triggered.
///
/// Every `interval`, purges jobs that finished more than `retention` ago.
pub async fn run(
    jobs: Arc<JobRegistry>,
    retention: Duration,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = interval.as_secs(),
        "Job retention loop started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention loop stopping");
                break;
            }
            _ = ticker.tick() => {
                let purged = sweep(&jobs, retention).await;
                if purged > 0 {
                    tracing::info!(purged, "Job retention: purged finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to purge");
                }
            }
        }
    }
}

/// Purge jobs that finished more than `retention` ago. Returns the count.
pub async fn sweep(jobs: &JobRegistry, retention: Duration) -> usize {
    let Some(cutoff) = chrono::Duration::from_std(retention)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
    else {
        return 0;
    };
    jobs.purge_finished_before(cutoff).await
}
