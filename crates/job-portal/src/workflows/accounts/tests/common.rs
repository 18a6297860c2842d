use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::store::InMemoryStore;
use crate::workflows::accounts::domain::RegistrationRequest;
use crate::workflows::accounts::{AccountService, TokenIssuer};
use crate::workflows::alerts::notifier::{DeliveryError, Notifier, Recipient};
use crate::workflows::listings::domain::{EducationLevel, JobCategory};

pub(super) const SECRET: &str = "accounts-test-secret";

/// Captures outbound mail subjects per address.
#[derive(Default)]
pub(super) struct MailSpy {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MailSpy {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn subjects_for(&self, email: &str) -> Vec<String> {
        self.sent
            .lock()
            .expect("spy mutex")
            .iter()
            .filter(|(to, _)| to == email)
            .map(|(_, subject)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for MailSpy {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        _body: &str,
    ) -> Result<bool, DeliveryError> {
        self.sent
            .lock()
            .expect("spy mutex")
            .push((recipient.email.clone(), subject.to_string()));
        if self.fail {
            return Err(DeliveryError::Transient("smtp relay down".to_string()));
        }
        Ok(true)
    }
}

pub(super) struct Harness {
    pub service: Arc<AccountService>,
    pub store: Arc<InMemoryStore>,
    pub mail: Arc<MailSpy>,
}

pub(super) fn harness_with(mail: MailSpy) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let mail = Arc::new(mail);
    let service = AccountService::new(
        store.clone(),
        mail.clone(),
        Arc::new(TokenIssuer::new(SECRET, 30)),
    )
    .with_send_timeout(Duration::from_secs(1));
    Harness {
        service: Arc::new(service),
        store,
        mail,
    }
}

pub(super) fn harness() -> Harness {
    harness_with(MailSpy::default())
}

pub(super) fn registration(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        full_name: "Meera Iyer".to_string(),
        password: "exam-ready-2025".to_string(),
        phone: Some("+91-9800000000".to_string()),
        location: Some("Chennai".to_string()),
        preferred_job_categories: [JobCategory::Banking, JobCategory::Ssc].into_iter().collect(),
        education_level: Some(EducationLevel::Graduate),
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("serializes")))
        .expect("request builds")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("json body")
}
