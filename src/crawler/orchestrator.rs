// src/crawler/orchestrator.rs
use crate::checkpoint::{CheckpointStore, CrawlCheckpoint};
use crate::crawler::extractor::ContactExtractor;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::crawler::heuristics::{dedup_key, employee_range_matches};
use crate::models::{CandidateRecord, CrawlCursor, LeadRecord, Result};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

/// Hard cap on concurrent detail fetches, regardless of configuration.
const WORKER_CAP: usize = 5;
/// A location is exhausted after this many consecutive listing pages
/// yielding zero new detail URLs.
const EMPTY_PAGE_LIMIT: u32 = 2;
const CHECKPOINT_RESULT_INTERVAL: usize = 20;
const CHECKPOINT_PAGE_INTERVAL: u32 = 5;

/// Mutable crawl progress, injected at construction so runs can start
/// fresh or from a loaded checkpoint.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub results: Vec<LeadRecord>,
    pub seen: HashSet<String>,
    pub cursor: CrawlCursor,
}

impl CrawlState {
    pub fn from_checkpoint(checkpoint: CrawlCheckpoint) -> Self {
        Self {
            results: checkpoint.results,
            seen: checkpoint.seen_companies.into_iter().collect(),
            cursor: CrawlCursor {
                location_idx: checkpoint.location_idx,
                page: checkpoint.page,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: String,
    pub locations: Vec<String>,
    pub target_count: usize,
    pub max_workers: usize,
    pub politeness_delay_ms: u64,
}

/// Drives the outer location/page loop: expands each listing page into
/// detail URLs, fans them out to a bounded worker pool, validates and
/// aggregates the results, and checkpoints progress as it goes.
///
/// All mutable state lives on this control task; workers only return
/// values, so aggregation needs no locking.
pub struct DirectoryCrawler {
    settings: CrawlSettings,
    fetcher: PageFetcher,
    extractor: Arc<ContactExtractor>,
    store: CheckpointStore,
    state: CrawlState,
    link_selector: Selector,
}

impl DirectoryCrawler {
    pub fn new(
        settings: CrawlSettings,
        fetcher: PageFetcher,
        extractor: ContactExtractor,
        store: CheckpointStore,
        state: CrawlState,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor: Arc::new(extractor),
            store,
            state,
            link_selector: Selector::parse(r#"a[href*="/company/"]"#).unwrap(),
        }
    }

    pub async fn run(mut self) -> Result<Vec<LeadRecord>> {
        let workers = self.settings.max_workers.clamp(1, WORKER_CAP);
        let semaphore = Arc::new(Semaphore::new(workers));

        info!(
            "Starting crawl: {} locations, target {} records, {} workers",
            self.settings.locations.len(),
            self.settings.target_count,
            workers
        );

        while self.state.cursor.location_idx < self.settings.locations.len() {
            let location = self.settings.locations[self.state.cursor.location_idx].clone();
            info!(
                "--- Location {}/{}: {} ---",
                self.state.cursor.location_idx + 1,
                self.settings.locations.len(),
                location
            );

            self.crawl_location(&location, &semaphore).await?;

            // Target-reached is checked before advancing, never mid-page,
            // so later locations are skipped entirely.
            if self.target_reached() {
                info!("Target reached; skipping remaining locations");
                break;
            }
            self.state.cursor.location_idx += 1;
            self.state.cursor.page = 1;
        }

        self.store.save(&self.snapshot())?;
        if self.target_reached() {
            self.store.delete()?;
        }

        Ok(self.state.results)
    }

    /// LISTING -> DISPATCHING -> AGGREGATING, page by page, until the
    /// location is exhausted or the global target is reached.
    async fn crawl_location(&mut self, location: &str, semaphore: &Arc<Semaphore>) -> Result<()> {
        let mut consecutive_empty = 0u32;

        loop {
            let page = self.state.cursor.page;
            let listing_url = self.listing_url(location, page);
            let discovered = match self.fetcher.fetch(&listing_url).await {
                FetchOutcome::Page(body) => self.discover_detail_urls(&body),
                FetchOutcome::Absent => Vec::new(),
            };
            let new_urls: Vec<String> = discovered
                .into_iter()
                .filter(|url| !self.state.seen.contains(&dedup_key(url)))
                .collect();

            if new_urls.is_empty() {
                consecutive_empty += 1;
                debug!(
                    "No new URLs on page {} of {} ({}/{})",
                    page, location, consecutive_empty, EMPTY_PAGE_LIMIT
                );
                if consecutive_empty >= EMPTY_PAGE_LIMIT {
                    info!("No more results for {}.", location);
                    return Ok(());
                }
            } else {
                consecutive_empty = 0;
                // Mark seen before dispatch: an abrupt stop re-fetches at
                // most one un-checkpointed batch and never double-counts.
                for url in &new_urls {
                    self.state.seen.insert(dedup_key(url));
                }
                let batch = self.dispatch_batch(new_urls, semaphore).await;
                self.aggregate(batch);
            }

            info!(
                "Page {} | {} | collected {}/{}",
                page,
                location,
                self.state.results.len(),
                self.settings.target_count
            );

            if self.state.results.len() % CHECKPOINT_RESULT_INTERVAL == 0
                || page % CHECKPOINT_PAGE_INTERVAL == 0
            {
                self.store.save(&self.snapshot())?;
            }

            if self.target_reached() {
                return Ok(());
            }
            self.state.cursor.page += 1;
        }
    }

    /// Submits one page's worth of detail URLs to the bounded pool and
    /// joins them all. A worker failing or panicking counts as that URL
    /// yielding nothing; siblings keep running.
    async fn dispatch_batch(
        &self,
        urls: Vec<String>,
        semaphore: &Arc<Semaphore>,
    ) -> Vec<CandidateRecord> {
        let mut tasks = JoinSet::new();
        for url in urls {
            let fetcher = self.fetcher.clone();
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(semaphore);
            let delay_ms = self.settings.politeness_delay_ms;
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                if delay_ms > 0 {
                    let jitter = fastrand::u64(0..=delay_ms / 2);
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                }
                match fetcher.fetch(&url).await {
                    FetchOutcome::Page(body) => extractor.extract(&body, &url),
                    FetchOutcome::Absent => None,
                }
            });
        }

        let mut candidates = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => warn!("Detail worker failed: {}", e),
            }
        }
        candidates
    }

    /// Validation filter: a candidate needs a first name, and a present
    /// employee range must sit inside the target band. An absent range
    /// passes; range unknown is not range bad.
    fn aggregate(&mut self, batch: Vec<CandidateRecord>) {
        for candidate in batch {
            if candidate.first_name.is_empty() {
                continue;
            }
            if !candidate.employee_range.is_empty()
                && !employee_range_matches(&candidate.employee_range)
            {
                debug!(
                    "Dropping {} ({}): employee range {:?} out of band",
                    candidate.first_name, candidate.source_url, candidate.employee_range
                );
                continue;
            }
            self.state.results.push(LeadRecord::from(candidate));
        }
    }

    fn discover_detail_urls(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);
        let base = Url::parse(&self.settings.base_url).ok();

        let mut urls = Vec::new();
        let mut seen_on_page = HashSet::new();
        for element in document.select(&self.link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let resolved = match Url::parse(href) {
                Ok(url) => Some(url.to_string()),
                Err(_) => base.as_ref().and_then(|b| b.join(href).ok()).map(|u| u.to_string()),
            };
            if let Some(url) = resolved {
                if seen_on_page.insert(dedup_key(&url)) {
                    urls.push(url);
                }
            }
        }
        urls
    }

    fn listing_url(&self, location: &str, page: u32) -> String {
        format!("{}/directory/{}?page={}", self.settings.base_url, location, page)
    }

    fn target_reached(&self) -> bool {
        self.state.results.len() >= self.settings.target_count
    }

    fn snapshot(&self) -> CrawlCheckpoint {
        let mut seen_companies: Vec<String> = self.state.seen.iter().cloned().collect();
        seen_companies.sort();
        CrawlCheckpoint {
            results: self.state.results.clone(),
            seen_companies,
            location_idx: self.state.cursor.location_idx,
            page: self.state.cursor.page,
        }
    }
}
