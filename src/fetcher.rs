//! HTTP fetcher for downloading the prefix list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::utils::format_bytes;

const TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

/// Maximum size of a prefix list (10 MB)
/// chnroutes is ~150 KB, a full country/ASN dump stays well below this
pub const MAX_LIST_SIZE: usize = 10 * 1024 * 1024;

/// Source of raw prefix list text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrefixSource: Send + Sync {
    /// Return the whole list as UTF-8 text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP client for fetching prefix lists
pub struct Fetcher {
    client: Client,
    retry_delay: Duration,
}

impl Fetcher {
    /// Create a new fetcher with default settings
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("birdroutes/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    /// Override the base delay between attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch content with retry logic and size validation
    async fn fetch_with_retry(&self, url: &str, max_size: usize) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_delay * (1 << (attempt - 1));
                debug!("Retry {} after {:?} for {}", attempt, delay, url);
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if !response.status().is_success() {
                        last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                        continue;
                    }

                    if let Some(content_length) = response.content_length() {
                        if content_length as usize > max_size {
                            return Err(anyhow::anyhow!(
                                "Response too large: {} bytes (max: {} bytes)",
                                content_length,
                                max_size
                            ));
                        }
                    }

                    let body = response
                        .text()
                        .await
                        .context("Failed to read response body")?;

                    // Content-Length may be absent (chunked) or wrong
                    if body.len() > max_size {
                        return Err(anyhow::anyhow!(
                            "Downloaded content too large: {} bytes (max: {} bytes)",
                            body.len(),
                            max_size
                        ));
                    }

                    return Ok(body);
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}

// Note: Default is intentionally not implemented for Fetcher
// because new() can fail and we want explicit error handling.

#[async_trait]
impl PrefixSource for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let content = self
            .fetch_with_retry(url, MAX_LIST_SIZE)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        info!(
            "Downloaded {} ({} lines)",
            format_bytes(content.len() as u64),
            content.lines().count()
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_new() {
        assert!(Fetcher::new().is_ok());
    }

    #[test]
    fn test_with_retry_delay() {
        let fetcher = Fetcher::new()
            .unwrap()
            .with_retry_delay(Duration::from_millis(5));
        assert_eq!(fetcher.retry_delay, Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_fails() {
        let fetcher = Fetcher::new()
            .unwrap()
            .with_retry_delay(Duration::from_millis(1));
        let result = fetcher.fetch("not-a-url").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not-a-url"));
    }

    #[tokio::test]
    async fn test_mock_prefix_source() {
        let mut mock = MockPrefixSource::new();
        mock.expect_fetch()
            .withf(|url| url == "https://example.com/list.txt")
            .times(1)
            .returning(|_| Ok("1.0.0.0/24\n".to_string()));

        let content = mock.fetch("https://example.com/list.txt").await.unwrap();
        assert_eq!(content, "1.0.0.0/24\n");
    }
}
