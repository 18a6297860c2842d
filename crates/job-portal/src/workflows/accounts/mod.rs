//! Accounts, credentials and notification preferences.

pub mod domain;
pub mod extract;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;
pub mod token;

#[cfg(test)]
mod tests;

pub use domain::{
    AccessToken, LoginRequest, NotificationPreferences, PreferenceUpdate, RegistrationRequest,
    User, UserId, UserRole, UserView,
};
pub use extract::{AuthError, AuthUser, RequireAdmin};
pub use repository::{PreferenceQuery, UserCursor, UserRepository};
pub use router::account_router;
pub use service::{AccountService, AccountServiceError};
pub use token::{Claims, Identity, TokenError, TokenIssuer};
