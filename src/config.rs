use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapingConfig {
    /// Root of the business directory being crawled.
    pub base_url: String,
    /// Location slugs crawled in order; each is paginated independently.
    pub locations: Vec<String>,
    /// Stop once this many validated records are collected.
    pub target_count: usize,
    /// Requested worker count; hard-capped at 5 in the orchestrator.
    pub max_workers: usize,
    pub request_timeout_seconds: u64,
    pub politeness_delay_ms: u64,
    pub checkpoint_path: String,
    /// When true, pick up from the last checkpoint if one exists.
    pub resume: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.businesslist.ph".to_string(),
            locations: vec![
                "metro-manila".to_string(),
                "quezon-city".to_string(),
                "cebu".to_string(),
                "davao".to_string(),
                "makati".to_string(),
            ],
            target_count: 5000,
            max_workers: 5,
            request_timeout_seconds: 30,
            politeness_delay_ms: 500,
            checkpoint_path: "output/checkpoint.json".to_string(),
            resume: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
