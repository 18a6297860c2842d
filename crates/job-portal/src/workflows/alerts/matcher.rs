use std::sync::Arc;

use crate::store::RepositoryError;
use crate::workflows::accounts::domain::{User, UserId};
use crate::workflows::accounts::repository::{PreferenceQuery, UserCursor, UserRepository};
use crate::workflows::listings::domain::Job;

pub const DEFAULT_PAGE_SIZE: usize = 200;
pub const DEFAULT_CANDIDATE_CAP: usize = 1000;

/// Candidates selected for one job.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub candidates: Vec<User>,
    /// More users matched than the soft cap allowed.
    pub truncated: bool,
}

/// Selects the users who should hear about a newly published job.
pub struct AlertMatcher {
    users: Arc<dyn UserRepository>,
    page_size: usize,
    cap: Option<usize>,
}

impl AlertMatcher {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            page_size: DEFAULT_PAGE_SIZE,
            cap: Some(DEFAULT_CANDIDATE_CAP),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// `None` lifts the soft cap entirely.
    pub fn with_cap(mut self, cap: Option<usize>) -> Self {
        self.cap = cap;
        self
    }

    pub fn query_for(job: &Job) -> PreferenceQuery {
        PreferenceQuery {
            category: job.category,
            education: job.min_education,
        }
    }

    /// Page through matching users without materialising the whole set.
    pub fn candidates<'a>(&'a self, job: &Job) -> CandidatePages<'a> {
        CandidatePages {
            matcher: self,
            query: Self::query_for(job),
            job_id: job.id.to_string(),
            last_seen: None,
            fetched: 0,
            exhausted: false,
            truncated: false,
        }
    }

    /// Collect every candidate for `job`, up to the soft cap.
    pub fn match_job(&self, job: &Job) -> Result<MatchOutcome, RepositoryError> {
        let mut pages = self.candidates(job);
        let mut candidates = Vec::new();
        while let Some(page) = pages.next_page()? {
            candidates.extend(page);
        }
        tracing::debug!(job_id = %job.id, candidates = candidates.len(), "matched alert candidates");
        Ok(MatchOutcome {
            candidates,
            truncated: pages.truncated(),
        })
    }
}

/// Cursor over the candidate pages of a single job.
pub struct CandidatePages<'a> {
    matcher: &'a AlertMatcher,
    query: PreferenceQuery,
    job_id: String,
    last_seen: Option<UserId>,
    fetched: usize,
    exhausted: bool,
    truncated: bool,
}

impl CandidatePages<'_> {
    /// Next non-empty page, or `None` once the repository or the cap is exhausted.
    pub fn next_page(&mut self) -> Result<Option<Vec<User>>, RepositoryError> {
        if self.exhausted {
            return Ok(None);
        }

        let limit = match self.matcher.cap {
            Some(cap) if self.fetched >= cap => {
                self.exhausted = true;
                self.truncated = self.more_beyond_cap()?;
                if self.truncated {
                    tracing::warn!(
                        job_id = %self.job_id,
                        cap,
                        "candidate cap reached; remaining matching users will not be alerted"
                    );
                }
                return Ok(None);
            }
            Some(cap) => self.matcher.page_size.min(cap - self.fetched),
            None => self.matcher.page_size,
        };

        let page = self
            .matcher
            .users
            .query_by_preference(&self.query, &self.cursor(limit))?;
        self.fetched += page.len();
        if let Some(last) = page.last() {
            self.last_seen = Some(last.id.clone());
        }

        if page.len() < limit {
            self.exhausted = true;
        }
        if page.is_empty() {
            return Ok(None);
        }
        Ok(Some(page))
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn fetched(&self) -> usize {
        self.fetched
    }

    fn cursor(&self, limit: usize) -> UserCursor {
        match &self.last_seen {
            Some(last) => UserCursor::after(last.clone(), limit),
            None => UserCursor::first(limit),
        }
    }

    fn more_beyond_cap(&self) -> Result<bool, RepositoryError> {
        let beyond = self
            .matcher
            .users
            .query_by_preference(&self.query, &self.cursor(1))?;
        Ok(!beyond.is_empty())
    }
}
