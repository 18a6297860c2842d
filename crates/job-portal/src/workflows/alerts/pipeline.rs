use metrics::counter;

use super::dispatcher::{DispatchReport, Dispatcher};
use super::matcher::AlertMatcher;
use crate::store::RepositoryError;
use crate::workflows::listings::domain::Job;

/// Matching and dispatch for one published job, with the alert counters.
pub struct JobAlertPipeline {
    matcher: AlertMatcher,
    dispatcher: Dispatcher,
}

impl JobAlertPipeline {
    pub fn new(matcher: AlertMatcher, dispatcher: Dispatcher) -> Self {
        Self {
            matcher,
            dispatcher,
        }
    }

    /// Stream candidate pages into a dispatch run and report every outcome.
    ///
    /// A repository failure stops matching; sends already queued still complete before the error
    /// is returned.
    pub async fn run(&self, job: &Job) -> Result<DispatchReport, RepositoryError> {
        counter!("job_alert_runs_total").increment(1);

        let mut run = self.dispatcher.start(job);
        let mut pages = self.matcher.candidates(job);
        loop {
            match pages.next_page() {
                Ok(Some(page)) => {
                    for user in page {
                        run.submit(user).await;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    let partial = run.finish().await;
                    record(&partial);
                    tracing::warn!(
                        job_id = %job.id,
                        delivered = partial.succeeded.len(),
                        "candidate lookup failed part way through dispatch"
                    );
                    return Err(err);
                }
            }
        }
        if pages.truncated() {
            run.mark_truncated();
        }

        let report = run.finish().await;
        record(&report);
        Ok(report)
    }
}

fn record(report: &DispatchReport) {
    counter!("job_alerts_sent_total").increment(report.succeeded.len() as u64);
    counter!("job_alerts_failed_total").increment(report.failed.len() as u64);
    counter!("job_alerts_skipped_total").increment(report.skipped.len() as u64);
}
