use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::accounts::domain::UserId;

/// Identifier wrapper for published job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recruitment categories a posting can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Banking,
    Railway,
    Teaching,
    Engineering,
    PoliceDefence,
    Ssc,
    Upsc,
    StateGovt,
    CentralGovt,
    Psu,
}

impl JobCategory {
    pub const ALL: [JobCategory; 10] = [
        JobCategory::Banking,
        JobCategory::Railway,
        JobCategory::Teaching,
        JobCategory::Engineering,
        JobCategory::PoliceDefence,
        JobCategory::Ssc,
        JobCategory::Upsc,
        JobCategory::StateGovt,
        JobCategory::CentralGovt,
        JobCategory::Psu,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobCategory::Banking => "Banking",
            JobCategory::Railway => "Railway",
            JobCategory::Teaching => "Teaching",
            JobCategory::Engineering => "Engineering",
            JobCategory::PoliceDefence => "Police & Defence",
            JobCategory::Ssc => "SSC",
            JobCategory::Upsc => "UPSC",
            JobCategory::StateGovt => "State Government",
            JobCategory::CentralGovt => "Central Government",
            JobCategory::Psu => "PSU",
        }
    }
}

/// Qualification levels. Matching compares levels for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "10th")]
    Class10,
    #[serde(rename = "12th")]
    Class12,
    #[serde(rename = "diploma")]
    Diploma,
    #[serde(rename = "iti")]
    Iti,
    #[serde(rename = "graduate")]
    Graduate,
    #[serde(rename = "post_graduate")]
    PostGraduate,
    #[serde(rename = "btech")]
    Btech,
    #[serde(rename = "bcom")]
    Bcom,
    #[serde(rename = "bsc")]
    Bsc,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::Class10 => "10th",
            EducationLevel::Class12 => "12th",
            EducationLevel::Diploma => "Diploma",
            EducationLevel::Iti => "ITI",
            EducationLevel::Graduate => "Graduate",
            EducationLevel::PostGraduate => "Post Graduate",
            EducationLevel::Btech => "B.Tech",
            EducationLevel::Bcom => "B.Com",
            EducationLevel::Bsc => "B.Sc",
        }
    }
}

/// Lifecycle of a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
    Draft,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

/// Administrator supplied payload for a new posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub organization: String,
    pub description: String,
    pub category: JobCategory,
    pub location: String,
    pub state: String,
    #[serde(default)]
    pub min_education: Option<EducationLevel>,
    #[serde(default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub min_age: Option<u8>,
    #[serde(default)]
    pub application_fee: f64,
    pub total_posts: u32,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    pub application_start_date: DateTime<Utc>,
    pub application_end_date: DateTime<Utc>,
    #[serde(default)]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub official_notification_url: Option<String>,
    #[serde(default)]
    pub apply_online_url: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if self.title.trim().is_empty() {
            return Err(JobValidationError::MissingField("title"));
        }
        if self.organization.trim().is_empty() {
            return Err(JobValidationError::MissingField("organization"));
        }
        if self.total_posts == 0 {
            return Err(JobValidationError::NoPosts);
        }
        if self.application_end_date < self.application_start_date {
            return Err(JobValidationError::InvertedWindow);
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(JobValidationError::InvertedRange("salary"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(JobValidationError::InvertedRange("age"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("total_posts must be greater than zero")]
    NoPosts,
    #[error("application_end_date precedes application_start_date")]
    InvertedWindow,
    #[error("{0} minimum exceeds maximum")]
    InvertedRange(&'static str),
}

/// A stored posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub organization: String,
    pub description: String,
    pub category: JobCategory,
    pub location: String,
    pub state: String,
    pub min_education: Option<EducationLevel>,
    pub max_age: Option<u8>,
    pub min_age: Option<u8>,
    pub application_fee: f64,
    pub total_posts: u32,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub application_start_date: DateTime<Utc>,
    pub application_end_date: DateTime<Utc>,
    pub exam_date: Option<DateTime<Utc>>,
    pub official_notification_url: Option<String>,
    pub apply_online_url: Option<String>,
    pub status: JobStatus,
    pub views: u64,
    pub applications_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl Job {
    pub fn from_draft(draft: JobDraft, created_by: UserId, now: DateTime<Utc>) -> Self {
        let JobDraft {
            title,
            organization,
            description,
            category,
            location,
            state,
            min_education,
            max_age,
            min_age,
            application_fee,
            total_posts,
            salary_min,
            salary_max,
            application_start_date,
            application_end_date,
            exam_date,
            official_notification_url,
            apply_online_url,
            status,
        } = draft;

        Self {
            id: JobId::generate(),
            title,
            organization,
            description,
            category,
            location,
            state,
            min_education,
            max_age,
            min_age,
            application_fee,
            total_posts,
            salary_min,
            salary_max,
            application_start_date,
            application_end_date,
            exam_date,
            official_notification_url,
            apply_online_url,
            status,
            views: 0,
            applications_count: 0,
            created_at: now,
            updated_at: now,
            created_by,
        }
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == JobStatus::Active
    }
}

/// Partial update applied by administrators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub application_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exam_date: Option<DateTime<Utc>>,
}

impl JobUpdate {
    pub fn apply_to(self, job: &mut Job, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(end) = self.application_end_date {
            job.application_end_date = end;
        }
        if let Some(exam_date) = self.exam_date {
            job.exam_date = Some(exam_date);
        }
        job.updated_at = now;
    }
}

/// Identifier wrapper for job applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    UnderReview,
    Shortlisted,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn new(job_id: JobId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId(uuid::Uuid::new_v4().to_string()),
            job_id,
            user_id,
            status: ApplicationStatus::Applied,
            applied_at: now,
            updated_at: now,
        }
    }
}
