use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;

use super::domain::{JobDraft, JobId, JobUpdate};
use super::service::{JobListingService, ListingFilters, ListingServiceError, SearchParams};
use crate::store::RepositoryError;
use crate::workflows::accounts::extract::{AuthUser, RequireAdmin};
use crate::workflows::accounts::token::TokenIssuer;

/// Public listing routes plus the admin and applicant endpoints built on them.
pub fn job_router(service: Arc<JobListingService>, tokens: Arc<TokenIssuer>) -> Router {
    Router::new()
        .route("/api/jobs", get(list_handler).post(create_handler))
        .route(
            "/api/jobs/:job_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/jobs/:job_id/apply", post(apply_handler))
        .route("/api/users/me/applications", get(my_applications_handler))
        .route("/api/search/jobs", get(search_handler))
        .route("/api/admin/dashboard", get(dashboard_handler))
        .route("/api/admin/seed-data", post(seed_handler))
        .layer(Extension(tokens))
        .with_state(service)
}

pub(crate) async fn list_handler(
    State(service): State<Arc<JobListingService>>,
    Query(filters): Query<ListingFilters>,
) -> Response {
    match service.list_jobs(&filters) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler(
    State(service): State<Arc<JobListingService>>,
    RequireAdmin(admin): RequireAdmin,
    Json(draft): Json<JobDraft>,
) -> Response {
    match service.create_job(draft, &admin.user_id) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler(
    State(service): State<Arc<JobListingService>>,
    Path(job_id): Path<String>,
) -> Response {
    match service.get_job(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler(
    State(service): State<Arc<JobListingService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(job_id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> Response {
    match service.update_job(&JobId(job_id), update) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler(
    State(service): State<Arc<JobListingService>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(job_id): Path<String>,
) -> Response {
    match service.delete_job(&JobId(job_id)) {
        Ok(()) => {
            let payload = json!({ "message": "Job deleted successfully" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn apply_handler(
    State(service): State<Arc<JobListingService>>,
    AuthUser(identity): AuthUser,
    Path(job_id): Path<String>,
) -> Response {
    match service.apply(&JobId(job_id), &identity.user_id).await {
        Ok(application) => {
            let payload = json!({
                "message": "Application submitted successfully",
                "application": application,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn my_applications_handler(
    State(service): State<Arc<JobListingService>>,
    AuthUser(identity): AuthUser,
) -> Response {
    match service.my_applications(&identity.user_id) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler(
    State(service): State<Arc<JobListingService>>,
    Query(params): Query<SearchParams>,
) -> Response {
    match service.search_jobs(&params) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler(
    State(service): State<Arc<JobListingService>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Response {
    match service.dashboard() {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn seed_handler(
    State(service): State<Arc<JobListingService>>,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    match service.seed_mock_jobs(&admin.user_id) {
        Ok(jobs) => {
            let payload = json!({
                "message": format!("Seeded {} mock jobs successfully", jobs.len()),
                "job_ids": jobs.iter().map(|job| job.id.0.clone()).collect::<Vec<_>>(),
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: ListingServiceError) -> Response {
    let status = match &err {
        ListingServiceError::Validation(_) | ListingServiceError::InvalidQuery(_) => {
            StatusCode::BAD_REQUEST
        }
        ListingServiceError::JobClosed | ListingServiceError::AlreadyApplied => {
            StatusCode::CONFLICT
        }
        ListingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ListingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ListingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            tracing::error!(error = %err, "listing request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = match &err {
        ListingServiceError::Repository(RepositoryError::NotFound) => "Job not found".to_string(),
        other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
}
