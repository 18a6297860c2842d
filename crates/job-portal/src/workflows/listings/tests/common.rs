use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::store::InMemoryStore;
use crate::workflows::accounts::domain::{NotificationPreferences, User, UserId, UserRole};
use crate::workflows::accounts::repository::UserRepository;
use crate::workflows::accounts::TokenIssuer;
use crate::workflows::alerts::notifier::{DeliveryError, Notifier, Recipient};
use crate::workflows::alerts::trigger::AlertTrigger;
use crate::workflows::listings::domain::{
    EducationLevel, Job, JobCategory, JobDraft, JobStatus,
};
use crate::workflows::listings::JobListingService;

pub(super) const SECRET: &str = "listings-test-secret";

/// Remembers every job handed to it instead of dispatching alerts.
#[derive(Default)]
pub(super) struct RecordingTrigger {
    pub published: Mutex<Vec<Job>>,
}

impl RecordingTrigger {
    pub fn titles(&self) -> Vec<String> {
        self.published
            .lock()
            .expect("trigger mutex")
            .iter()
            .map(|job| job.title.clone())
            .collect()
    }
}

impl AlertTrigger for RecordingTrigger {
    fn job_published(&self, job: Job) {
        self.published.lock().expect("trigger mutex").push(job);
    }
}

#[derive(Default)]
pub(super) struct MailSpy {
    pub subjects: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for MailSpy {
    async fn send(
        &self,
        _recipient: &Recipient,
        subject: &str,
        _body: &str,
    ) -> Result<bool, DeliveryError> {
        self.subjects
            .lock()
            .expect("spy mutex")
            .push(subject.to_string());
        Err(DeliveryError::Transient("relay offline".to_string()))
    }
}

pub(super) struct Harness {
    pub service: Arc<JobListingService>,
    pub store: Arc<InMemoryStore>,
    pub trigger: Arc<RecordingTrigger>,
    pub mail: Arc<MailSpy>,
    pub tokens: Arc<TokenIssuer>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let trigger = Arc::new(RecordingTrigger::default());
    let mail = Arc::new(MailSpy::default());
    let service = JobListingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        mail.clone(),
        trigger.clone(),
    )
    .with_send_timeout(Duration::from_secs(1));

    Harness {
        service: Arc::new(service),
        store,
        trigger,
        mail,
        tokens: Arc::new(TokenIssuer::new(SECRET, 30)),
    }
}

impl Harness {
    pub fn account(&self, id: &str, role: UserRole) -> User {
        let user = User {
            id: UserId(id.to_string()),
            email: format!("{id}@example.in"),
            full_name: format!("Account {id}"),
            phone: None,
            location: None,
            preferred_job_categories: BTreeSet::new(),
            education_level: None,
            role,
            is_active: true,
            email_verified: true,
            created_at: Utc::now(),
            last_login: None,
            notification_preferences: NotificationPreferences::default(),
            password_hash: String::new(),
        };
        UserRepository::insert(self.store.as_ref(), user).expect("account inserted")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user, Utc::now()).expect("token issued")
    }
}

pub(super) fn draft(title: &str, category: JobCategory) -> JobDraft {
    let start = Utc
        .with_ymd_and_hms(2025, 7, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    JobDraft {
        title: title.to_string(),
        organization: "Railway Recruitment Board".to_string(),
        description: "Non-technical popular categories".to_string(),
        category,
        location: "Secunderabad".to_string(),
        state: "Telangana".to_string(),
        min_education: Some(EducationLevel::Class12),
        max_age: Some(33),
        min_age: Some(18),
        application_fee: 500.0,
        total_posts: 3445,
        salary_min: Some(19_900.0),
        salary_max: Some(29_200.0),
        application_start_date: start,
        application_end_date: start + chrono::Duration::days(30),
        exam_date: None,
        official_notification_url: Some("https://rrb.example.in/ntpc".to_string()),
        apply_online_url: None,
        status: JobStatus::Active,
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    body: Option<&Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(value).expect("serializes"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("json body")
}
