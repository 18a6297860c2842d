//! Job alerts: select the users interested in a newly published job and e-mail each of them once.

pub mod dispatcher;
pub mod email;
pub mod ledger;
pub mod matcher;
pub mod notifier;
pub mod pipeline;
pub mod templates;
pub mod trigger;

#[cfg(test)]
mod tests;

pub use dispatcher::{
    DispatchFailure, DispatchReport, DispatchRun, DispatchSettings, Dispatcher,
    NotificationOutcome,
};
pub use email::{EmailError, SmtpNotifier};
pub use ledger::DeliveryLedger;
pub use matcher::{AlertMatcher, CandidatePages, MatchOutcome};
pub use notifier::{
    send_best_effort, send_with_timeout, DeliveryError, DisabledNotifier, LogNotifier, Notifier,
    Recipient,
};
pub use pipeline::JobAlertPipeline;
pub use templates::ComposedMessage;
pub use trigger::{AlertTrigger, SpawnedAlertTrigger};
