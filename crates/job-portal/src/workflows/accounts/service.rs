use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::domain::{
    AccessToken, LoginRequest, PreferenceUpdate, RegistrationRequest, User, UserId, UserRole,
    UserView,
};
use super::password::{
    hash_password, password_is_strong_enough, verify_password, MIN_PASSWORD_LENGTH,
};
use super::repository::UserRepository;
use super::token::{TokenError, TokenIssuer};
use crate::store::RepositoryError;
use crate::workflows::alerts::notifier::{send_best_effort, Notifier, Recipient};
use crate::workflows::alerts::templates::compose_welcome;

/// Registration, login and profile management.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<TokenIssuer>,
    send_timeout: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            notifier,
            tokens,
            send_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn tokens(&self) -> Arc<TokenIssuer> {
        Arc::clone(&self.tokens)
    }

    /// Create an account and send the welcome mail. A failed mail does not fail registration.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<UserView, AccountServiceError> {
        let user = self.new_account(
            request.email,
            request.full_name,
            &request.password,
            UserRole::User,
        )?;
        let user = User {
            phone: request.phone,
            location: request.location,
            preferred_job_categories: request.preferred_job_categories,
            education_level: request.education_level,
            ..user
        };

        let stored = self.users.insert(user).map_err(|err| match err {
            RepositoryError::Conflict => AccountServiceError::EmailTaken,
            other => AccountServiceError::Repository(other),
        })?;
        tracing::info!(user_id = %stored.id, "account registered");

        let welcome = compose_welcome(&stored);
        send_best_effort(
            self.notifier.as_ref(),
            &Recipient::from(&stored),
            &welcome.subject,
            &welcome.body,
            self.send_timeout,
        )
        .await;

        Ok(stored.view())
    }

    pub fn login(&self, request: LoginRequest) -> Result<AccessToken, AccountServiceError> {
        let mut user = self
            .users
            .fetch_by_email(request.email.trim())?
            .ok_or(AccountServiceError::InvalidCredentials)?;

        let verified = verify_password(&request.password, &user.password_hash).map_err(|err| {
            tracing::error!(user_id = %user.id, error = %err, "stored password hash unreadable");
            AccountServiceError::InvalidCredentials
        })?;
        if !verified {
            return Err(AccountServiceError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AccountServiceError::Inactive);
        }

        let now = Utc::now();
        user.last_login = Some(now);
        let token = self.tokens.issue(&user, now)?;
        self.users.update(user)?;
        Ok(AccessToken::bearer(token))
    }

    pub fn me(&self, user_id: &UserId) -> Result<UserView, AccountServiceError> {
        let user = self
            .users
            .fetch(user_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(user.view())
    }

    pub fn update_preferences(
        &self,
        user_id: &UserId,
        update: PreferenceUpdate,
    ) -> Result<UserView, AccountServiceError> {
        let mut user = self
            .users
            .fetch(user_id)?
            .ok_or(RepositoryError::NotFound)?;
        update.apply_to(&mut user);
        self.users.update(user.clone())?;
        tracing::info!(user_id = %user.id, "notification preferences updated");
        Ok(user.view())
    }

    /// Create the configured administrator, or promote the existing account with that address.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<UserView, AccountServiceError> {
        if let Some(mut existing) = self.users.fetch_by_email(email.trim())? {
            if existing.role != UserRole::Admin {
                existing.role = UserRole::Admin;
                self.users.update(existing.clone())?;
                tracing::info!(user_id = %existing.id, "existing account promoted to admin");
            }
            return Ok(existing.view());
        }

        let admin = self.new_account(
            email.to_string(),
            "Administrator".to_string(),
            password,
            UserRole::Admin,
        )?;
        let stored = self.users.insert(admin)?;
        tracing::info!(user_id = %stored.id, "bootstrap administrator created");
        Ok(stored.view())
    }

    fn new_account(
        &self,
        email: String,
        full_name: String,
        password: &str,
        role: UserRole,
    ) -> Result<User, AccountServiceError> {
        let email = email.trim().to_string();
        if email.parse::<lettre::Address>().is_err() {
            return Err(AccountServiceError::InvalidEmail(email));
        }
        if full_name.trim().is_empty() {
            return Err(AccountServiceError::MissingName);
        }
        if !password_is_strong_enough(password) {
            return Err(AccountServiceError::WeakPassword);
        }
        let password_hash = hash_password(password)
            .map_err(|err| AccountServiceError::Hashing(err.to_string()))?;

        Ok(User {
            id: UserId::generate(),
            email,
            full_name: full_name.trim().to_string(),
            phone: None,
            location: None,
            preferred_job_categories: Default::default(),
            education_level: None,
            role,
            is_active: true,
            email_verified: false,
            created_at: Utc::now(),
            last_login: None,
            notification_preferences: Default::default(),
            password_hash,
        })
    }
}

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
    #[error("full_name must not be empty")]
    MissingName,
    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("account is inactive")]
    Inactive,
    #[error("password could not be hashed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
