// src/crawler/mod.rs
pub mod extractor;
pub mod fetcher;
pub mod heuristics;
pub mod orchestrator;

pub use extractor::ContactExtractor;
pub use fetcher::{FetchOutcome, PageFetcher};
pub use orchestrator::{CrawlSettings, CrawlState, DirectoryCrawler};
