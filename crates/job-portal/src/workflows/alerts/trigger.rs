use std::sync::Arc;

use super::pipeline::JobAlertPipeline;
use crate::workflows::listings::domain::Job;

/// Hook invoked after a job has been persisted with status `active`.
///
/// Implementations must return immediately; the caller never waits on alert delivery.
pub trait AlertTrigger: Send + Sync {
    fn job_published(&self, job: Job);
}

/// Runs the alert pipeline on a detached tokio task.
pub struct SpawnedAlertTrigger {
    pipeline: Arc<JobAlertPipeline>,
}

impl SpawnedAlertTrigger {
    pub fn new(pipeline: Arc<JobAlertPipeline>) -> Self {
        Self { pipeline }
    }
}

impl AlertTrigger for SpawnedAlertTrigger {
    fn job_published(&self, job: Job) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(job_id = %job.id, "no async runtime; job alerts skipped");
            return;
        };

        let pipeline = Arc::clone(&self.pipeline);
        handle.spawn(async move {
            match pipeline.run(&job).await {
                Ok(report) => tracing::info!(
                    job_id = %report.job_id,
                    attempted = report.attempted(),
                    failed = report.failed.len(),
                    truncated = report.truncated,
                    "job alerts processed"
                ),
                Err(err) => {
                    tracing::error!(job_id = %job.id, error = %err, "alerts could not be computed")
                }
            }
        });
    }
}
