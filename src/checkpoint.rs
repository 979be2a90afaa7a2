// src/checkpoint.rs
use crate::models::{LeadRecord, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Durable snapshot of crawl progress. Rewritten wholesale on every save;
/// read once at startup when resuming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlCheckpoint {
    pub results: Vec<LeadRecord>,
    pub seen_companies: Vec<String>,
    pub location_idx: usize,
    pub page: u32,
}

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means no prior state. A file that exists but fails to
    /// parse degrades to a fresh run with a warning; an unreadable file is
    /// an error, since no durable progress can be trusted.
    pub fn load(&self) -> Result<Option<CrawlCheckpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<CrawlCheckpoint>(&content) {
            Ok(checkpoint) => {
                info!(
                    "Loaded checkpoint: {} records, {} seen companies, location {}, page {}",
                    checkpoint.results.len(),
                    checkpoint.seen_companies.len(),
                    checkpoint.location_idx,
                    checkpoint.page
                );
                Ok(Some(checkpoint))
            }
            Err(e) => {
                warn!(
                    "Failed to parse checkpoint {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Full rewrite through a temp file so a crash mid-write leaves the
    /// previous snapshot intact.
    pub fn save(&self, checkpoint: &CrawlCheckpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(checkpoint)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Removes the snapshot once the run no longer needs to resume.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_checkpoint() -> CrawlCheckpoint {
        CrawlCheckpoint {
            results: vec![LeadRecord {
                first_name: "Juan".to_string(),
                last_name: "Dela Cruz".to_string(),
                company: "Acme Trading".to_string(),
                email: "juan@acme.ph".to_string(),
                title: "Manager".to_string(),
            }],
            seen_companies: vec!["acme-trading".to_string(), "beta-shop".to_string()],
            location_idx: 1,
            page: 7,
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample_checkpoint()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].first_name, "Juan");
        assert_eq!(loaded.seen_companies.len(), 2);
        assert_eq!(loaded.location_idx, 1);
        assert_eq!(loaded.page, 7);
    }

    #[test]
    fn missing_file_is_no_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CheckpointStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample_checkpoint()).unwrap();
        store.delete().unwrap();
        assert!(!store.path().exists());
        store.delete().unwrap(); // second delete is a no-op
    }

    #[test]
    fn save_replaces_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let mut checkpoint = sample_checkpoint();
        store.save(&checkpoint).unwrap();
        checkpoint.page = 8;
        store.save(&checkpoint).unwrap();

        assert_eq!(store.load().unwrap().unwrap().page, 8);
    }
}
