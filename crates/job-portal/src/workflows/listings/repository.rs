use serde::{Deserialize, Serialize};

use super::domain::{EducationLevel, Job, JobApplication, JobCategory, JobId, JobStatus};
use crate::store::{PageRequest, RepositoryError};
use crate::workflows::accounts::domain::{UserId, UserView};

/// Filter set understood by job stores. Text fields match case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub category: Option<JobCategory>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub salary_min: Option<f64>,
    /// Matched against title, organization, and description.
    pub text: Option<String>,
    /// Matched against title, organization, description, and location.
    pub keyword: Option<String>,
}

impl JobQuery {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(category) = self.category {
            if job.category != category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if !contains_ignore_case(&job.state, state) {
                return false;
            }
        }
        if let Some(level) = self.education_level {
            if job.min_education != Some(level) {
                return false;
            }
        }
        if let Some(floor) = self.salary_min {
            match job.salary_max.or(job.salary_min) {
                Some(ceiling) if ceiling >= floor => {}
                _ => return false,
            }
        }
        if let Some(text) = &self.text {
            let hit = [&job.title, &job.organization, &job.description]
                .iter()
                .any(|field| contains_ignore_case(field, text));
            if !hit {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let hit = [&job.title, &job.organization, &job.description, &job.location]
                .iter()
                .any(|field| contains_ignore_case(field, keyword));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Storage abstraction for postings.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;
    /// Matching jobs, newest first.
    fn search(&self, query: &JobQuery, page: PageRequest) -> Result<Vec<Job>, RepositoryError>;
    fn count(&self, status: Option<JobStatus>) -> Result<u64, RepositoryError>;
    fn record_view(&self, id: &JobId) -> Result<Job, RepositoryError>;
    fn record_application(&self, id: &JobId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for applications. At most one record per (job, user).
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: JobApplication) -> Result<JobApplication, RepositoryError>;
    fn exists(&self, job_id: &JobId, user_id: &UserId) -> Result<bool, RepositoryError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<JobApplication>, RepositoryError>;
    fn count(&self) -> Result<u64, RepositoryError>;
}

/// Aggregate counters shown on the administrator dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub total_users: u64,
    pub total_applications: u64,
    pub recent_jobs: Vec<Job>,
    pub recent_users: Vec<UserView>,
}
