use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::store::{InMemoryStore, RepositoryError};
use crate::workflows::accounts::domain::{NotificationPreferences, User, UserId, UserRole};
use crate::workflows::accounts::repository::{PreferenceQuery, UserCursor, UserRepository};
use crate::workflows::alerts::ledger::DeliveryLedger;
use crate::workflows::alerts::notifier::{DeliveryError, Notifier, Recipient};
use crate::workflows::alerts::DispatchSettings;
use crate::workflows::listings::domain::{
    EducationLevel, Job, JobCategory, JobDraft, JobId, JobStatus,
};

pub(super) fn user(
    id: &str,
    categories: &[JobCategory],
    education: Option<EducationLevel>,
    email_alerts: bool,
) -> User {
    User {
        id: UserId(id.to_string()),
        email: format!("{id}@example.in"),
        full_name: format!("Candidate {id}"),
        phone: None,
        location: None,
        preferred_job_categories: categories.iter().copied().collect::<BTreeSet<_>>(),
        education_level: education,
        role: UserRole::User,
        is_active: true,
        email_verified: true,
        created_at: Utc::now(),
        last_login: None,
        notification_preferences: NotificationPreferences {
            email_alerts,
            ..NotificationPreferences::default()
        },
        password_hash: String::new(),
    }
}

pub(super) fn job(category: JobCategory, min_education: Option<EducationLevel>) -> Job {
    let start = Utc
        .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    Job::from_draft(
        JobDraft {
            title: "Probationary Officer".to_string(),
            organization: "Bank of Baroda".to_string(),
            description: "Officer cadre recruitment".to_string(),
            category,
            location: "Vadodara".to_string(),
            state: "Gujarat".to_string(),
            min_education,
            max_age: Some(30),
            min_age: Some(21),
            application_fee: 600.0,
            total_posts: 500,
            salary_min: Some(48_480.0),
            salary_max: Some(85_920.0),
            application_start_date: start,
            application_end_date: start + chrono::Duration::days(21),
            exam_date: None,
            official_notification_url: None,
            apply_online_url: None,
            status: JobStatus::Active,
        },
        UserId("admin".to_string()),
        start,
    )
}

pub(super) fn store_with(users: Vec<User>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for user in users {
        UserRepository::insert(store.as_ref(), user).expect("user inserted");
    }
    store
}

pub(super) fn ids(users: &[User]) -> HashSet<String> {
    users.iter().map(|user| user.id.0.clone()).collect()
}

pub(super) fn id_set(ids: &[UserId]) -> HashSet<String> {
    ids.iter().map(|id| id.0.clone()).collect()
}

pub(super) fn settings(concurrency: usize, queue_depth: usize) -> DispatchSettings {
    DispatchSettings {
        concurrency,
        queue_depth,
        send_timeout: Duration::from_secs(5),
    }
}

/// Records every send and fails for a configured set of user ids.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    failing: HashSet<String>,
    declining: HashSet<String>,
}

impl RecordingNotifier {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn declining_for(ids: &[&str]) -> Self {
        Self {
            declining: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().expect("notifier mutex").len()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .iter()
            .map(|(user_id, _)| user_id.clone())
            .collect()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .iter()
            .map(|(_, subject)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        _body: &str,
    ) -> Result<bool, DeliveryError> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .push((recipient.user_id.0.clone(), subject.to_string()));
        if self.failing.contains(&recipient.user_id.0) {
            return Err(DeliveryError::Transient("relay refused".to_string()));
        }
        Ok(!self.declining.contains(&recipient.user_id.0))
    }
}

/// Sleeps for every recipient; used to exercise the per-send timeout.
pub(super) struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send(&self, _: &Recipient, _: &str, _: &str) -> Result<bool, DeliveryError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(true)
    }
}

/// Stalls for one recipient and answers the rest at once, noting when each send finished.
pub(super) struct OneSlowRecipient {
    slow: String,
    delay: Duration,
    started: tokio::time::Instant,
    pub finished: Mutex<Vec<(String, Duration)>>,
}

impl OneSlowRecipient {
    pub fn new(slow: &str, delay: Duration) -> Self {
        Self {
            slow: slow.to_string(),
            delay,
            started: tokio::time::Instant::now(),
            finished: Mutex::new(Vec::new()),
        }
    }

    pub fn finished_at(&self, user_id: &str) -> Option<Duration> {
        self.finished
            .lock()
            .expect("notifier mutex")
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, at)| *at)
    }
}

#[async_trait]
impl Notifier for OneSlowRecipient {
    async fn send(&self, recipient: &Recipient, _: &str, _: &str) -> Result<bool, DeliveryError> {
        if recipient.user_id.0 == self.slow {
            tokio::time::sleep(self.delay).await;
        }
        self.finished
            .lock()
            .expect("notifier mutex")
            .push((recipient.user_id.0.clone(), self.started.elapsed()));
        Ok(true)
    }
}

/// Panics for one user to simulate a worker dying mid-send.
pub(super) struct PanickingNotifier {
    pub victim: String,
}

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send(&self, recipient: &Recipient, _: &str, _: &str) -> Result<bool, DeliveryError> {
        if recipient.user_id.0 == self.victim {
            panic!("simulated notifier crash");
        }
        Ok(true)
    }
}

/// User repository that is always down.
pub(super) struct UnavailableUsers;

impl UserRepository for UnavailableUsers {
    fn insert(&self, _: User) -> Result<User, RepositoryError> {
        Err(unavailable())
    }
    fn update(&self, _: User) -> Result<(), RepositoryError> {
        Err(unavailable())
    }
    fn fetch(&self, _: &UserId) -> Result<Option<User>, RepositoryError> {
        Err(unavailable())
    }
    fn fetch_by_email(&self, _: &str) -> Result<Option<User>, RepositoryError> {
        Err(unavailable())
    }
    fn query_by_preference(
        &self,
        _: &PreferenceQuery,
        _: &UserCursor,
    ) -> Result<Vec<User>, RepositoryError> {
        Err(unavailable())
    }
    fn count(&self) -> Result<u64, RepositoryError> {
        Err(unavailable())
    }
    fn recent(&self, _: usize) -> Result<Vec<User>, RepositoryError> {
        Err(unavailable())
    }
}

/// Wraps the in-memory store and counts preference queries.
pub(super) struct CountingUsers {
    pub inner: Arc<InMemoryStore>,
    pub pages: Mutex<Vec<UserCursor>>,
}

impl CountingUsers {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            pages: Mutex::new(Vec::new()),
        }
    }
}

impl UserRepository for CountingUsers {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        UserRepository::insert(self.inner.as_ref(), user)
    }
    fn update(&self, user: User) -> Result<(), RepositoryError> {
        UserRepository::update(self.inner.as_ref(), user)
    }
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::fetch(self.inner.as_ref(), id)
    }
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_by_email(email)
    }
    fn query_by_preference(
        &self,
        query: &PreferenceQuery,
        cursor: &UserCursor,
    ) -> Result<Vec<User>, RepositoryError> {
        self.pages.lock().expect("pages mutex").push(cursor.clone());
        self.inner.query_by_preference(query, cursor)
    }
    fn count(&self) -> Result<u64, RepositoryError> {
        UserRepository::count(self.inner.as_ref())
    }
    fn recent(&self, limit: usize) -> Result<Vec<User>, RepositoryError> {
        self.inner.recent(limit)
    }
}

/// Serves the first `healthy_queries` preference queries from the store, then goes down.
pub(super) struct OutageAfter {
    inner: Arc<InMemoryStore>,
    healthy_queries: usize,
    queries: Mutex<usize>,
}

impl OutageAfter {
    pub fn new(inner: Arc<InMemoryStore>, healthy_queries: usize) -> Self {
        Self {
            inner,
            healthy_queries,
            queries: Mutex::new(0),
        }
    }
}

impl UserRepository for OutageAfter {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        UserRepository::insert(self.inner.as_ref(), user)
    }
    fn update(&self, user: User) -> Result<(), RepositoryError> {
        UserRepository::update(self.inner.as_ref(), user)
    }
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::fetch(self.inner.as_ref(), id)
    }
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_by_email(email)
    }
    fn query_by_preference(
        &self,
        query: &PreferenceQuery,
        cursor: &UserCursor,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut queries = self.queries.lock().expect("query counter");
        *queries += 1;
        if *queries > self.healthy_queries {
            return Err(unavailable());
        }
        self.inner.query_by_preference(query, cursor)
    }
    fn count(&self) -> Result<u64, RepositoryError> {
        UserRepository::count(self.inner.as_ref())
    }
    fn recent(&self, limit: usize) -> Result<Vec<User>, RepositoryError> {
        self.inner.recent(limit)
    }
}

/// Ledger whose reads always fail; writes are counted.
#[derive(Default)]
pub(super) struct BrokenLedger {
    pub writes: Mutex<usize>,
}

impl DeliveryLedger for BrokenLedger {
    fn already_sent(&self, _: &JobId, _: &UserId) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }

    fn record_sent(&self, _: &JobId, _: &UserId) -> Result<(), RepositoryError> {
        *self.writes.lock().expect("ledger mutex") += 1;
        Ok(())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}
