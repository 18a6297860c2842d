use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use job_portal::workflows::accounts::{account_router, AccountService, TokenIssuer};
use job_portal::workflows::alerts::{
    AlertMatcher, DeliveryError, DispatchSettings, Dispatcher, JobAlertPipeline, Notifier,
    Recipient, SpawnedAlertTrigger,
};
use job_portal::workflows::listings::{job_router, JobListingService};
use job_portal::InMemoryStore;

const ADMIN_EMAIL: &str = "admin@freejobalert.com";
const ADMIN_PASSWORD: &str = "admin-password-2025";

struct Outbox {
    tx: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl Notifier for Outbox {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        _body: &str,
    ) -> Result<bool, DeliveryError> {
        let _ = self.tx.send((recipient.email.clone(), subject.to_string()));
        Ok(true)
    }
}

struct Portal {
    app: Router,
    outbox: mpsc::UnboundedReceiver<(String, String)>,
}

fn portal() -> Portal {
    let (tx, outbox) = mpsc::unbounded_channel();
    let notifier: Arc<dyn Notifier> = Arc::new(Outbox { tx });
    let store = Arc::new(InMemoryStore::new());
    let tokens = Arc::new(TokenIssuer::new("integration-secret", 30));

    let pipeline = JobAlertPipeline::new(
        AlertMatcher::new(store.clone()),
        Dispatcher::new(notifier.clone(), DispatchSettings::default()).with_ledger(store.clone()),
    );
    let accounts = Arc::new(AccountService::new(
        store.clone(),
        notifier.clone(),
        tokens.clone(),
    ));
    accounts
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .expect("admin bootstrap");
    let listings = Arc::new(JobListingService::new(
        store.clone(),
        store.clone(),
        store,
        notifier,
        Arc::new(SpawnedAlertTrigger::new(Arc::new(pipeline))),
    ));

    Portal {
        app: account_router(accounts).merge(job_router(listings, tokens)),
        outbox,
    }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": email, "password": password })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().expect("token").to_string()
}

async fn alert_for(
    outbox: &mut mpsc::UnboundedReceiver<(String, String)>,
    email: &str,
    wait: Duration,
) -> Option<String> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        match tokio::time::timeout_at(deadline, outbox.recv()).await {
            Ok(Some((to, subject))) if to == email && subject.starts_with("New job alert") => {
                return Some(subject)
            }
            Ok(Some(_)) => continue,
            _ => return None,
        }
    }
}

#[tokio::test]
async fn published_job_reaches_interested_member_who_then_applies() {
    let Portal { app, mut outbox } = portal();

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": "aspirant@example.in",
            "full_name": "Railway Aspirant",
            "password": "loco-pilot-2025",
            "preferred_job_categories": ["railway"],
            "education_level": "12th",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, job) = call(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({
            "title": "RRB ALP Recruitment 2025",
            "organization": "Railway Recruitment Board",
            "description": "Assistant Loco Pilot posts",
            "category": "railway",
            "location": "Chennai",
            "state": "Tamil Nadu",
            "min_education": "12th",
            "total_posts": 9970,
            "application_start_date": "2025-04-10T00:00:00Z",
            "application_end_date": "2099-05-09T00:00:00Z",
        })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {job}");

    let subject = alert_for(&mut outbox, "aspirant@example.in", Duration::from_secs(5))
        .await
        .expect("alert delivered");
    assert_eq!(
        subject,
        "New job alert: RRB ALP Recruitment 2025 (Railway Recruitment Board)"
    );

    let member = login(&app, "aspirant@example.in", "loco-pilot-2025").await;
    let job_id = job["id"].as_str().expect("job id");
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/jobs/{job_id}/apply"),
        None,
        Some(&member),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, applications) = call(
        &app,
        Method::GET,
        "/api/users/me/applications",
        None,
        Some(&member),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applications.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn members_outside_the_category_are_not_alerted() {
    let Portal { app, mut outbox } = portal();

    call(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": "banker@example.in",
            "full_name": "Bank Aspirant",
            "password": "probationary-2025",
            "preferred_job_categories": ["banking"],
        })),
        None,
    )
    .await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({
            "title": "UPSC Civil Services 2025",
            "organization": "Union Public Service Commission",
            "description": "Civil services examination",
            "category": "upsc",
            "location": "New Delhi",
            "state": "Delhi",
            "total_posts": 979,
            "application_start_date": "2025-01-22T00:00:00Z",
            "application_end_date": "2099-02-11T00:00:00Z",
        })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin_alert = alert_for(&mut outbox, ADMIN_EMAIL, Duration::from_secs(5)).await;
    assert!(admin_alert.is_some(), "admin has no category filter");
    let alert = alert_for(&mut outbox, "banker@example.in", Duration::from_millis(300)).await;
    assert_eq!(alert, None);
}
