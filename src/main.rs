use directory_leads::checkpoint::CheckpointStore;
use directory_leads::config::{load_config, Config};
use directory_leads::crawler::{ContactExtractor, CrawlSettings, CrawlState, DirectoryCrawler, PageFetcher};
use directory_leads::export::LeadExporter;
use directory_leads::Result;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration before logging so the configured level applies.
    let (config, config_loaded) = match load_config("config.yml").await {
        Ok(config) => (config, true),
        Err(_) => (Config::default(), false),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("directory_leads={}", config.logging.level))
        }))
        .init();

    if !config_loaded {
        warn!("Failed to load config.yml. Using defaults.");
    }

    if config.scraping.locations.is_empty() {
        error!("No locations configured; nothing to scrape");
        std::process::exit(1);
    }

    std::fs::create_dir_all(&config.output.directory)?;

    let store = CheckpointStore::new(&config.scraping.checkpoint_path);
    let state = if config.scraping.resume {
        match store.load()? {
            Some(checkpoint) => CrawlState::from_checkpoint(checkpoint),
            None => {
                info!("No checkpoint found. Starting fresh.");
                CrawlState::default()
            }
        }
    } else {
        CrawlState::default()
    };

    let settings = CrawlSettings {
        base_url: config.scraping.base_url.clone(),
        locations: config.scraping.locations.clone(),
        target_count: config.scraping.target_count,
        max_workers: config.scraping.max_workers,
        politeness_delay_ms: config.scraping.politeness_delay_ms,
    };
    let fetcher = PageFetcher::new(config.scraping.request_timeout_seconds)?;
    let crawler = DirectoryCrawler::new(settings, fetcher, ContactExtractor::new(), store, state);
    let exporter = LeadExporter::new();

    tokio::select! {
        result = crawler.run() => {
            let records = result?;
            exporter.export_run(&records, &config.output.directory)?;
            if records.len() < config.scraping.target_count {
                info!(
                    "Collected {}/{} records. Run again with resume enabled to continue.",
                    records.len(),
                    config.scraping.target_count
                );
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down. Progress is checkpointed; rerun to resume.");
            // Export what the last durable snapshot holds; the batch in
            // flight is re-fetched on resume, not lost.
            let store = CheckpointStore::new(&config.scraping.checkpoint_path);
            if let Some(checkpoint) = store.load()? {
                exporter.export_run(&checkpoint.results, &config.output.directory)?;
            }
        }
    }

    Ok(())
}
