use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;

use super::domain::{LoginRequest, PreferenceUpdate, RegistrationRequest};
use super::extract::AuthUser;
use super::service::{AccountService, AccountServiceError};
use crate::store::RepositoryError;

/// Registration, login and profile routes.
pub fn account_router(service: Arc<AccountService>) -> Router {
    let tokens = service.tokens();
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/users/me/preferences", put(preferences_handler))
        .layer(Extension(tokens))
        .with_state(service)
}

pub(crate) async fn register_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<RegistrationRequest>,
) -> Response {
    match service.register(request).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn login_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match service.login(request) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn me_handler(
    State(service): State<Arc<AccountService>>,
    AuthUser(identity): AuthUser,
) -> Response {
    match service.me(&identity.user_id) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn preferences_handler(
    State(service): State<Arc<AccountService>>,
    AuthUser(identity): AuthUser,
    Json(update): Json<PreferenceUpdate>,
) -> Response {
    match service.update_preferences(&identity.user_id, update) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AccountServiceError) -> Response {
    let status = match &err {
        AccountServiceError::InvalidEmail(_)
        | AccountServiceError::MissingName
        | AccountServiceError::WeakPassword => StatusCode::BAD_REQUEST,
        AccountServiceError::EmailTaken => StatusCode::CONFLICT,
        AccountServiceError::InvalidCredentials | AccountServiceError::Inactive => {
            StatusCode::UNAUTHORIZED
        }
        AccountServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AccountServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AccountServiceError::Hashing(_)
        | AccountServiceError::Token(_)
        | AccountServiceError::Repository(RepositoryError::Unavailable(_)) => {
            tracing::error!(error = %err, "account request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
