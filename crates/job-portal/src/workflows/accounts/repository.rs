use serde::{Deserialize, Serialize};

use super::domain::{User, UserId};
use crate::store::RepositoryError;
use crate::workflows::listings::domain::{EducationLevel, JobCategory};

/// Alert-eligibility predicate evaluated by user stores.
///
/// A user matches when e-mail alerts are enabled, their preferred categories are empty or contain
/// `category`, and, when `education` is set, their education level equals it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    pub category: JobCategory,
    pub education: Option<EducationLevel>,
}

impl PreferenceQuery {
    pub fn matches(&self, user: &User) -> bool {
        if !user.notification_preferences.email_alerts {
            return false;
        }

        let category_match = user.preferred_job_categories.is_empty()
            || user.preferred_job_categories.contains(&self.category);
        if !category_match {
            return false;
        }

        match self.education {
            Some(required) => user.education_level == Some(required),
            None => true,
        }
    }
}

/// Keyset window over users ordered by id: at most `limit` users whose id sorts after `after`.
///
/// Rows that stop matching between two windows never shift later users out of reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCursor {
    pub after: Option<UserId>,
    pub limit: usize,
}

impl UserCursor {
    pub fn first(limit: usize) -> Self {
        Self { after: None, limit }
    }

    pub fn after(last: UserId, limit: usize) -> Self {
        Self {
            after: Some(last),
            limit,
        }
    }
}

/// Storage abstraction for accounts.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// Users satisfying `query` with ids after `cursor.after`, in ascending id order.
    fn query_by_preference(
        &self,
        query: &PreferenceQuery,
        cursor: &UserCursor,
    ) -> Result<Vec<User>, RepositoryError>;
    fn count(&self) -> Result<u64, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<User>, RepositoryError>;
}
