use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Raw extraction output for one detail page. A page yields at most one
/// candidate; a candidate without a first name carries no signal and is
/// discarded before validation.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub title: String,
    pub employee_range: String,
    pub source_url: String,
}

/// The externally emitted shape: a candidate stripped of crawl-internal
/// fields after passing validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub title: String,
}

impl From<CandidateRecord> for LeadRecord {
    fn from(candidate: CandidateRecord) -> Self {
        Self {
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            company: candidate.company,
            email: candidate.email,
            title: candidate.title,
        }
    }
}

/// Position in the outer (location) x inner (page) iteration space.
/// Only ever moves forward within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlCursor {
    pub location_idx: usize,
    pub page: u32,
}

impl Default for CrawlCursor {
    fn default() -> Self {
        Self {
            location_idx: 0,
            page: 1,
        }
    }
}
