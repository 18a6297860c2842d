use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use super::ledger::DeliveryLedger;
use super::notifier::{send_with_timeout, DeliveryError, Notifier, Recipient};
use super::templates::{compose_job_alert, ComposedMessage};
use crate::workflows::accounts::domain::{User, UserId};
use crate::workflows::listings::domain::{Job, JobId};

/// Result of handing one candidate to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    Skipped,
    Failed(DeliveryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchFailure {
    pub user_id: UserId,
    pub error: DeliveryError,
}

/// Per-candidate tally of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub job_id: JobId,
    pub succeeded: Vec<UserId>,
    pub skipped: Vec<UserId>,
    pub failed: Vec<DispatchFailure>,
    pub truncated: bool,
}

impl DispatchReport {
    pub fn empty(job_id: JobId) -> Self {
        Self {
            job_id,
            succeeded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            truncated: false,
        }
    }

    /// Sends actually handed to the notifier.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// How `user_id` fared in this run, if it was a candidate at all.
    pub fn outcome_for(&self, user_id: &UserId) -> Option<NotificationOutcome> {
        if let Some(failure) = self.failed.iter().find(|failure| &failure.user_id == user_id) {
            return Some(NotificationOutcome::Failed(failure.error.clone()));
        }
        if self.succeeded.contains(user_id) {
            return Some(NotificationOutcome::Sent);
        }
        if self.skipped.contains(user_id) {
            return Some(NotificationOutcome::Skipped);
        }
        None
    }

    pub fn failed_ids(&self) -> Vec<UserId> {
        self.failed
            .iter()
            .map(|failure| failure.user_id.clone())
            .collect()
    }
}

/// Tuning knobs for a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub concurrency: usize,
    pub queue_depth: usize,
    pub send_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            queue_depth: 64,
            send_timeout: Duration::from_secs(10),
        }
    }
}

/// Delivers a job alert to each candidate on a bounded worker pool.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    ledger: Option<Arc<dyn DeliveryLedger>>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, settings: DispatchSettings) -> Self {
        Self {
            notifier,
            ledger: None,
            settings,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn DeliveryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn settings(&self) -> DispatchSettings {
        self.settings
    }

    /// Spawn the worker pool for `job`. Must be called from within a tokio runtime.
    pub fn start(&self, job: &Job) -> DispatchRun {
        let context = Arc::new(WorkerContext {
            job_id: job.id.clone(),
            message: compose_job_alert(job),
            notifier: Arc::clone(&self.notifier),
            ledger: self.ledger.clone(),
            send_timeout: self.settings.send_timeout,
        });

        let (queue, receiver) = mpsc::channel::<User>(self.settings.queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let (results_tx, results) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for _ in 0..self.settings.concurrency.max(1) {
            let context = Arc::clone(&context);
            let receiver = Arc::clone(&receiver);
            let results_tx = results_tx.clone();
            workers.spawn(async move {
                loop {
                    let next = { receiver.lock().await.recv().await };
                    let Some(user) = next else { break };
                    let user_id = user.id.clone();
                    let outcome = context.deliver(user).await;
                    if results_tx.send((user_id, outcome)).is_err() {
                        break;
                    }
                }
            });
        }

        DispatchRun {
            report: DispatchReport::empty(job.id.clone()),
            queue: Some(queue),
            workers,
            results,
            seen: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    /// Send the alert for `job` to every candidate and wait for all sends to settle.
    pub async fn dispatch(&self, job: &Job, candidates: Vec<User>) -> DispatchReport {
        let mut run = self.start(job);
        for candidate in candidates {
            run.submit(candidate).await;
        }
        run.finish().await
    }
}

struct WorkerContext {
    job_id: JobId,
    message: ComposedMessage,
    notifier: Arc<dyn Notifier>,
    ledger: Option<Arc<dyn DeliveryLedger>>,
    send_timeout: Duration,
}

impl WorkerContext {
    async fn deliver(&self, user: User) -> NotificationOutcome {
        if let Some(ledger) = &self.ledger {
            match ledger.already_sent(&self.job_id, &user.id) {
                Ok(true) => {
                    tracing::debug!(job_id = %self.job_id, user_id = %user.id, "alert already delivered");
                    return NotificationOutcome::Skipped;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(job_id = %self.job_id, user_id = %user.id, error = %err, "delivery ledger lookup failed");
                }
            }
        }

        let recipient = Recipient::from(&user);
        let sent = send_with_timeout(
            self.notifier.as_ref(),
            &recipient,
            &self.message.subject,
            &self.message.body,
            self.send_timeout,
        )
        .await;

        match sent {
            Ok(()) => {
                if let Some(ledger) = &self.ledger {
                    if let Err(err) = ledger.record_sent(&self.job_id, &user.id) {
                        tracing::warn!(job_id = %self.job_id, user_id = %user.id, error = %err, "delivery ledger write failed");
                    }
                }
                NotificationOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(job_id = %self.job_id, user_id = %user.id, error = %err, "job alert not delivered");
                NotificationOutcome::Failed(err)
            }
        }
    }
}

/// An in-progress dispatch. Feed it with [`DispatchRun::submit`], then call [`DispatchRun::finish`].
pub struct DispatchRun {
    report: DispatchReport,
    queue: Option<mpsc::Sender<User>>,
    workers: JoinSet<()>,
    results: mpsc::UnboundedReceiver<(UserId, NotificationOutcome)>,
    seen: HashSet<UserId>,
    pending: HashSet<UserId>,
}

impl DispatchRun {
    pub fn job_id(&self) -> &JobId {
        &self.report.job_id
    }

    /// Queue a candidate, waiting while the queue is full. Repeats within the run are skipped.
    pub async fn submit(&mut self, user: User) {
        if !self.seen.insert(user.id.clone()) {
            tracing::debug!(job_id = %self.report.job_id, user_id = %user.id, "duplicate candidate skipped");
            self.report.skipped.push(user.id);
            return;
        }

        let Some(queue) = &self.queue else {
            self.abort(user.id, "dispatch run already closed");
            return;
        };

        let user_id = user.id.clone();
        self.pending.insert(user_id.clone());
        if queue.send(user).await.is_err() {
            self.pending.remove(&user_id);
            self.abort(user_id, "no dispatch workers available");
        }
    }

    pub fn mark_truncated(&mut self) {
        self.report.truncated = true;
    }

    /// Close the queue, wait for the workers and return the tally.
    pub async fn finish(mut self) -> DispatchReport {
        self.queue.take();

        while let Some(joined) = self.workers.join_next().await {
            if let Err(err) = joined {
                tracing::error!(job_id = %self.report.job_id, error = %err, "dispatch worker stopped unexpectedly");
            }
        }

        while let Some((user_id, outcome)) = self.results.recv().await {
            self.pending.remove(&user_id);
            match outcome {
                NotificationOutcome::Sent => self.report.succeeded.push(user_id),
                NotificationOutcome::Skipped => self.report.skipped.push(user_id),
                NotificationOutcome::Failed(error) => {
                    self.report.failed.push(DispatchFailure { user_id, error })
                }
            }
        }

        let lost: Vec<UserId> = self.pending.drain().collect();
        for user_id in lost {
            self.abort(user_id, "worker exited before reporting");
        }

        let report = self.report;
        tracing::info!(
            job_id = %report.job_id,
            succeeded = report.succeeded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            truncated = report.truncated,
            "job alert dispatch finished"
        );
        report
    }

    fn abort(&mut self, user_id: UserId, reason: &str) {
        tracing::warn!(job_id = %self.report.job_id, user_id = %user_id, reason, "job alert not delivered");
        self.report.failed.push(DispatchFailure {
            user_id,
            error: DeliveryError::Aborted(reason.to_string()),
        });
    }
}
