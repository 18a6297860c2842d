use crate::store::RepositoryError;
use crate::workflows::accounts::domain::UserId;
use crate::workflows::listings::domain::JobId;

/// Record of (job, user) pairs that already received an alert.
///
/// Consulted by the dispatcher before each send so a repeated dispatch run for the same job does
/// not notify a user twice.
pub trait DeliveryLedger: Send + Sync {
    fn already_sent(&self, job_id: &JobId, user_id: &UserId) -> Result<bool, RepositoryError>;
    fn record_sent(&self, job_id: &JobId, user_id: &UserId) -> Result<(), RepositoryError>;
}
