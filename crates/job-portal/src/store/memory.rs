use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{PageRequest, RepositoryError};
use crate::workflows::accounts::domain::{User, UserId};
use crate::workflows::accounts::repository::{PreferenceQuery, UserCursor, UserRepository};
use crate::workflows::alerts::ledger::DeliveryLedger;
use crate::workflows::listings::domain::{Job, JobApplication, JobId, JobStatus};
use crate::workflows::listings::repository::{ApplicationRepository, JobQuery, JobRepository};

/// Process-local document store backing every repository trait.
#[derive(Default)]
pub struct InMemoryStore {
    jobs: Mutex<HashMap<JobId, Job>>,
    users: Mutex<HashMap<UserId, User>>,
    applications: Mutex<Vec<JobApplication>>,
    delivered: Mutex<HashSet<(JobId, UserId)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobRepository for InMemoryStore {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.jobs)?;
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs)?;
        match guard.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs)?.get(id).cloned())
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        lock(&self.jobs)?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn search(&self, query: &JobQuery, page: PageRequest) -> Result<Vec<Job>, RepositoryError> {
        let guard = lock(&self.jobs)?;
        let mut hits: Vec<&Job> = guard.values().filter(|job| query.matches(job)).collect();
        hits.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(hits
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    fn count(&self, status: Option<JobStatus>) -> Result<u64, RepositoryError> {
        let guard = lock(&self.jobs)?;
        let total = match status {
            Some(status) => guard.values().filter(|job| job.status == status).count(),
            None => guard.len(),
        };
        Ok(total as u64)
    }

    fn record_view(&self, id: &JobId) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.jobs)?;
        let job = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        job.views += 1;
        Ok(job.clone())
    }

    fn record_application(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs)?;
        let job = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        job.applications_count += 1;
        Ok(())
    }
}

impl UserRepository for InMemoryStore {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.users)?;
        let duplicate = guard.contains_key(&user.id)
            || guard
                .values()
                .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.users)?;
        match guard.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)?.get(id).cloned())
    }

    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)?
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn query_by_preference(
        &self,
        query: &PreferenceQuery,
        cursor: &UserCursor,
    ) -> Result<Vec<User>, RepositoryError> {
        let guard = lock(&self.users)?;
        let mut hits: Vec<&User> = guard
            .values()
            .filter(|user| match &cursor.after {
                Some(after) => user.id > *after,
                None => true,
            })
            .filter(|user| query.matches(user))
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(hits.into_iter().take(cursor.limit).cloned().collect())
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        Ok(lock(&self.users)?.len() as u64)
    }

    fn recent(&self, limit: usize) -> Result<Vec<User>, RepositoryError> {
        let guard = lock(&self.users)?;
        let mut users: Vec<&User> = guard.values().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users.into_iter().take(limit).cloned().collect())
    }
}

impl ApplicationRepository for InMemoryStore {
    fn insert(&self, application: JobApplication) -> Result<JobApplication, RepositoryError> {
        let mut guard = lock(&self.applications)?;
        let duplicate = guard.iter().any(|existing| {
            existing.job_id == application.job_id && existing.user_id == application.user_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.push(application.clone());
        Ok(application)
    }

    fn exists(&self, job_id: &JobId, user_id: &UserId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.applications)?
            .iter()
            .any(|existing| &existing.job_id == job_id && &existing.user_id == user_id))
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<JobApplication>, RepositoryError> {
        let guard = lock(&self.applications)?;
        let mut applications: Vec<JobApplication> = guard
            .iter()
            .filter(|application| &application.user_id == user_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(applications)
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        Ok(lock(&self.applications)?.len() as u64)
    }
}

impl DeliveryLedger for InMemoryStore {
    fn already_sent(&self, job_id: &JobId, user_id: &UserId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.delivered)?.contains(&(job_id.clone(), user_id.clone())))
    }

    fn record_sent(&self, job_id: &JobId, user_id: &UserId) -> Result<(), RepositoryError> {
        lock(&self.delivered)?.insert((job_id.clone(), user_id.clone()));
        Ok(())
    }
}
