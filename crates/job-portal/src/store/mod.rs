//! Persistence contracts shared by every workflow plus the in-memory backing store.

mod memory;

pub use memory::InMemoryStore;

use serde::{Deserialize, Serialize};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Offset window used by paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// One-based page number to offset window.
    pub fn from_page(page: u32, limit: u32) -> Self {
        let page = page.max(1) as usize;
        let limit = limit as usize;
        Self {
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }

    pub fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}
