use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflows::accounts::domain::{User, UserId};

/// Addressing details handed to a notifier; decoupled from the stored account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Why a single delivery did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DeliveryError {
    /// Transport could not be reached (connection refused, relay down).
    #[error("transport unavailable: {0}")]
    Transient(String),
    /// The message can never be delivered as addressed (malformed address, rejected mailbox).
    #[error("undeliverable: {0}")]
    Permanent(String),
    /// The notifier returned `false` without an error.
    #[error("notifier declined the message")]
    Rejected,
    #[error("send timed out after {0} ms")]
    Timeout(u64),
    /// The worker handling the send stopped before reporting.
    #[error("delivery aborted: {0}")]
    Aborted(String),
}

/// Outbound channel for user-facing messages.
///
/// `Ok(false)` and `Err(_)` both mean the message was not delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<bool, DeliveryError>;
}

/// Send once under `timeout`, folding `Ok(false)` into [`DeliveryError::Rejected`].
pub async fn send_with_timeout(
    notifier: &dyn Notifier,
    recipient: &Recipient,
    subject: &str,
    body: &str,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(timeout, notifier.send(recipient, subject, body)).await {
        Ok(Ok(true)) => Ok(()),
        Ok(Ok(false)) => Err(DeliveryError::Rejected),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(DeliveryError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Fire a transactional message whose failure must not affect the calling operation.
pub async fn send_best_effort(
    notifier: &dyn Notifier,
    recipient: &Recipient,
    subject: &str,
    body: &str,
    timeout: Duration,
) -> bool {
    match send_with_timeout(notifier, recipient, subject, body, timeout).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(user_id = %recipient.user_id, subject, error = %err, "notification not delivered");
            false
        }
    }
}

/// Used when no transport is configured: every message is declined and logged.
#[derive(Debug, Default, Clone)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        _body: &str,
    ) -> Result<bool, DeliveryError> {
        tracing::warn!(user_id = %recipient.user_id, subject, "email transport not configured; message dropped");
        Ok(false)
    }
}

/// Writes messages to the log instead of sending them. Handy for demos and local runs.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<bool, DeliveryError> {
        tracing::info!(
            to = %recipient.email,
            user_id = %recipient.user_id,
            subject,
            body_bytes = body.len(),
            "notification logged"
        );
        Ok(true)
    }
}
