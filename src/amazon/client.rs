//! HTTP client for Amazon requests using wreq for TLS fingerprint emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for URL resolution and page fetching - enables mocking for tests.
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Follows redirects and returns the final URL.
    ///
    /// Resolution failure is non-fatal: the original URL is returned
    /// unchanged and treated as already canonical.
    async fn resolve(&self, url: &str) -> String;

    /// Fetches a page and returns the raw HTML body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Amazon HTTP client with browser impersonation.
pub struct AmazonClient {
    client: Client,
}

impl AmazonClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Performs a GET request with browser-like headers.
    async fn get(&self, url: &str) -> Result<wreq::Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        debug!("Response status: {}", response.status());

        Ok(response)
    }
}

#[async_trait]
impl PageFetch for AmazonClient {
    async fn resolve(&self, url: &str) -> String {
        match self.get(url).await {
            Ok(response) if response.status().is_success() => {
                let final_url = response.uri().to_string();
                debug!("URL {} resolved to {}", url, final_url);
                final_url
            }
            Ok(response) => {
                warn!(
                    "Could not resolve URL {} (status {}). Proceeding with original.",
                    url,
                    response.status()
                );
                url.to_string()
            }
            Err(e) => {
                warn!("Could not resolve URL {}: {}. Proceeding with original.", url, e);
                url.to_string()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}
