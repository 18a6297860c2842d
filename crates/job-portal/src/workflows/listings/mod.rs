//! Job postings, applications and the administrator dashboard.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, EducationLevel, Job, JobApplication, JobCategory, JobDraft,
    JobId, JobStatus, JobUpdate, JobValidationError,
};
pub use repository::{AdminDashboard, ApplicationRepository, JobQuery, JobRepository};
pub use router::job_router;
pub use service::{JobListingService, ListingFilters, ListingServiceError, SearchParams};
