//! Government job portal: listings, accounts and e-mail job alerts.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;

pub use config::AppConfig;
pub use error::AppError;
pub use store::{InMemoryStore, PageRequest, RepositoryError};
