use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    EducationLevel, Job, JobApplication, JobCategory, JobDraft, JobId, JobStatus, JobUpdate,
    JobValidationError,
};
use super::repository::{AdminDashboard, ApplicationRepository, JobQuery, JobRepository};
use crate::store::{PageRequest, RepositoryError};
use crate::workflows::accounts::domain::UserId;
use crate::workflows::accounts::repository::UserRepository;
use crate::workflows::alerts::notifier::{send_best_effort, Notifier, Recipient};
use crate::workflows::alerts::templates::compose_application_confirmation;
use crate::workflows::alerts::trigger::AlertTrigger;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;
const DASHBOARD_RECENT: usize = 5;

/// Query-string filters for the public job list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilters {
    #[serde(default)]
    pub category: Option<JobCategory>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    /// Defaults to `active`.
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query-string parameters for keyword search over active jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub category: Option<JobCategory>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Postings, applications and the admin dashboard.
pub struct JobListingService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    alerts: Arc<dyn AlertTrigger>,
    send_timeout: Duration,
}

impl JobListingService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        alerts: Arc<dyn AlertTrigger>,
    ) -> Self {
        Self {
            jobs,
            applications,
            users,
            notifier,
            alerts,
            send_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Persist a posting and hand active ones to the alert trigger. Never waits on delivery.
    pub fn create_job(
        &self,
        draft: JobDraft,
        created_by: &UserId,
    ) -> Result<Job, ListingServiceError> {
        draft.validate()?;
        let job = Job::from_draft(draft, created_by.clone(), Utc::now());
        let stored = self.jobs.insert(job)?;
        tracing::info!(job_id = %stored.id, category = stored.category.label(), status = stored.status.label(), "job created");

        if stored.status == JobStatus::Active {
            self.alerts.job_published(stored.clone());
        }
        Ok(stored)
    }

    /// Fetch a posting, counting the view.
    pub fn get_job(&self, job_id: &JobId) -> Result<Job, ListingServiceError> {
        Ok(self.jobs.record_view(job_id)?)
    }

    pub fn list_jobs(&self, filters: &ListingFilters) -> Result<Vec<Job>, ListingServiceError> {
        let page = paging(filters.page, filters.limit)?;
        let query = JobQuery {
            status: Some(filters.status.unwrap_or(JobStatus::Active)),
            category: filters.category,
            location: non_empty(&filters.location),
            state: non_empty(&filters.state),
            education_level: filters.education_level,
            salary_min: filters.salary_min,
            text: non_empty(&filters.q),
            keyword: None,
        };
        Ok(self.jobs.search(&query, page)?)
    }

    pub fn search_jobs(&self, params: &SearchParams) -> Result<Vec<Job>, ListingServiceError> {
        let keyword = params.q.trim();
        if keyword.is_empty() {
            return Err(ListingServiceError::InvalidQuery(
                "q must not be empty".to_string(),
            ));
        }
        let page = paging(params.page, params.limit)?;
        let query = JobQuery {
            status: Some(JobStatus::Active),
            category: params.category,
            location: non_empty(&params.location),
            keyword: Some(keyword.to_string()),
            ..JobQuery::default()
        };
        Ok(self.jobs.search(&query, page)?)
    }

    pub fn update_job(&self, job_id: &JobId, update: JobUpdate) -> Result<Job, ListingServiceError> {
        let mut job = self
            .jobs
            .fetch(job_id)?
            .ok_or(RepositoryError::NotFound)?;
        if matches!(&update.title, Some(title) if title.trim().is_empty()) {
            return Err(JobValidationError::MissingField("title").into());
        }
        update.apply_to(&mut job, Utc::now());
        if job.application_end_date < job.application_start_date {
            return Err(JobValidationError::InvertedWindow.into());
        }
        self.jobs.update(job.clone())?;
        tracing::info!(job_id = %job.id, status = job.status.label(), "job updated");
        Ok(job)
    }

    pub fn delete_job(&self, job_id: &JobId) -> Result<(), ListingServiceError> {
        self.jobs.delete(job_id)?;
        tracing::info!(job_id = %job_id, "job deleted");
        Ok(())
    }

    /// Record an application and send the confirmation mail best-effort.
    pub async fn apply(
        &self,
        job_id: &JobId,
        user_id: &UserId,
    ) -> Result<JobApplication, ListingServiceError> {
        let job = self
            .jobs
            .fetch(job_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !job.accepts_applications() {
            return Err(ListingServiceError::JobClosed);
        }
        if self.applications.exists(job_id, user_id)? {
            return Err(ListingServiceError::AlreadyApplied);
        }

        let application = JobApplication::new(job_id.clone(), user_id.clone(), Utc::now());
        let stored = self
            .applications
            .insert(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => ListingServiceError::AlreadyApplied,
                other => ListingServiceError::Repository(other),
            })?;
        self.jobs.record_application(job_id)?;
        tracing::info!(job_id = %job_id, user_id = %user_id, application_id = %stored.id, "application submitted");

        match self.users.fetch(user_id) {
            Ok(Some(user)) => {
                let message = compose_application_confirmation(&user, &job, stored.applied_at);
                send_best_effort(
                    self.notifier.as_ref(),
                    &Recipient::from(&user),
                    &message.subject,
                    &message.body,
                    self.send_timeout,
                )
                .await;
            }
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "applicant account missing; confirmation skipped")
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "confirmation skipped")
            }
        }

        Ok(stored)
    }

    pub fn my_applications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<JobApplication>, ListingServiceError> {
        Ok(self.applications.for_user(user_id)?)
    }

    pub fn dashboard(&self) -> Result<AdminDashboard, ListingServiceError> {
        let recent_jobs = self
            .jobs
            .search(&JobQuery::default(), PageRequest::new(0, DASHBOARD_RECENT))?;
        let recent_users = self
            .users
            .recent(DASHBOARD_RECENT)?
            .iter()
            .map(|user| user.view())
            .collect();

        Ok(AdminDashboard {
            total_jobs: self.jobs.count(None)?,
            active_jobs: self.jobs.count(Some(JobStatus::Active))?,
            total_users: self.users.count()?,
            total_applications: self.applications.count()?,
            recent_jobs,
            recent_users,
        })
    }

    /// Insert three sample postings. Seeding does not fire job alerts.
    pub fn seed_mock_jobs(&self, created_by: &UserId) -> Result<Vec<Job>, ListingServiceError> {
        let now = Utc::now();
        let mut seeded = Vec::new();
        for draft in sample_drafts(now) {
            draft.validate()?;
            let job = Job::from_draft(draft, created_by.clone(), now);
            seeded.push(self.jobs.insert(job)?);
        }
        tracing::info!(count = seeded.len(), "sample jobs seeded");
        Ok(seeded)
    }
}

fn paging(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, ListingServiceError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if page == 0 {
        return Err(ListingServiceError::InvalidQuery(
            "page must be at least 1".to_string(),
        ));
    }
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ListingServiceError::InvalidQuery(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    Ok(PageRequest::from_page(page, limit))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn sample_drafts(now: DateTime<Utc>) -> Vec<JobDraft> {
    let draft = |title: &str,
                 organization: &str,
                 description: &str,
                 category: JobCategory,
                 (location, state): (&str, &str),
                 min_education: EducationLevel,
                 total_posts: u32,
                 (salary_min, salary_max): (f64, f64),
                 open_days: i64| JobDraft {
        title: title.to_string(),
        organization: organization.to_string(),
        description: description.to_string(),
        category,
        location: location.to_string(),
        state: state.to_string(),
        min_education: Some(min_education),
        max_age: None,
        min_age: None,
        application_fee: 0.0,
        total_posts,
        salary_min: Some(salary_min),
        salary_max: Some(salary_max),
        application_start_date: now,
        application_end_date: now + chrono::Duration::days(open_days),
        exam_date: None,
        official_notification_url: None,
        apply_online_url: None,
        status: JobStatus::Active,
    };

    vec![
        draft(
            "BHEL 515 Artisan Online Form 2025",
            "Bharat Heavy Electricals Limited",
            "BHEL invites applications for 515 Artisan posts across various disciplines.",
            JobCategory::Engineering,
            ("New Delhi", "Delhi"),
            EducationLevel::Iti,
            515,
            (25_000.0, 35_000.0),
            30,
        ),
        draft(
            "Indian Coast Guard Assistant Commandant Online Form 2025",
            "Indian Coast Guard",
            "Indian Coast Guard recruitment for Assistant Commandant positions.",
            JobCategory::PoliceDefence,
            ("Mumbai", "Maharashtra"),
            EducationLevel::Graduate,
            50,
            (56_100.0, 177_500.0),
            25,
        ),
        draft(
            "Bank of Baroda 2500 LBO Online Form 2025",
            "Bank of Baroda",
            "Bank of Baroda recruitment for 2500 Language Banking Officer posts.",
            JobCategory::Banking,
            ("Vadodara", "Gujarat"),
            EducationLevel::Graduate,
            2500,
            (23_700.0, 42_020.0),
            20,
        ),
    ]
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error(transparent)]
    Validation(#[from] JobValidationError),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("job is not accepting applications")]
    JobClosed,
    #[error("already applied for this job")]
    AlreadyApplied,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
