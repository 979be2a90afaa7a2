// src/crawler/fetcher.rs
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 4;

/// Outcome of fetching one page. Absence is a normal signal (404, retry
/// budget exhausted, end of pagination), never an error.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Raw page body. Parsing happens downstream so worker futures stay Send.
    Page(String),
    Absent,
}

#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    backoff_unit: Duration,
}

impl PageFetcher {
    pub fn new(timeout_seconds: u64) -> crate::models::Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; DirectoryLeadsBot/1.0)")
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            backoff_unit: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// GET with bounded retry. 429 and transport errors back off and retry;
    /// 404 is a definitive miss; anything else non-2xx is retried and
    /// degrades to `Absent` once the budget runs out. Backoff sleeps only
    /// suspend the calling task, so sibling fetches keep running.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        for attempt in 0..MAX_ATTEMPTS {
            let backoff = self.backoff_unit * (1u32 << (attempt + 1));
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        debug!("404 for {}", url);
                        return FetchOutcome::Absent;
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!("Rate limited on {}. Waiting {}s...", url, backoff.as_secs());
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    if !status.is_success() {
                        warn!(
                            "HTTP {} for {}. Retrying in {}s...",
                            status,
                            url,
                            backoff.as_secs()
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    match response.text().await {
                        Ok(body) => {
                            debug!("Fetched {} bytes from {}", body.len(), url);
                            return FetchOutcome::Page(body);
                        }
                        Err(e) => {
                            warn!(
                                "Failed to read body from {} ({}). Retrying in {}s...",
                                url,
                                e,
                                backoff.as_secs()
                            );
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Request error for {} ({}). Retrying in {}s...",
                        url,
                        e,
                        backoff.as_secs()
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        warn!("Giving up on {} after {} attempts", url, MAX_ATTEMPTS);
        FetchOutcome::Absent
    }
}
