//! URL shortening via public APIs with provider fallback.
//!
//! TinyURL is tried first, then is.gd. When both fail the original URL is
//! returned: shortening is cosmetic and must never break a reply.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const TINYURL_BASE: &str = "https://tinyurl.com";
const ISGD_BASE: &str = "https://is.gd";

/// Trait for URL shortening - enables mocking for tests.
#[async_trait]
pub trait Shorten: Send + Sync {
    /// Shortens a URL, falling back to the input when all providers fail.
    async fn shorten(&self, long_url: &str) -> String;
}

/// Shortener client backed by TinyURL and is.gd.
pub struct UrlShortener {
    client: Client,
    tinyurl_base: String,
    isgd_base: String,
}

impl UrlShortener {
    /// Creates a shortener with the given per-call timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Self::with_base_urls(TINYURL_BASE.to_string(), ISGD_BASE.to_string(), timeout_secs)
    }

    /// Creates a shortener with custom provider base URLs (for testing).
    pub fn with_base_urls(
        tinyurl_base: String,
        isgd_base: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, tinyurl_base, isgd_base })
    }

    /// Calls one provider endpoint and validates the response body.
    async fn try_provider(&self, api_url: &str) -> Result<String> {
        debug!("GET {}", api_url);

        let response = self.client.get(api_url).send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Shortener returned status: {}", response.status());
        }

        let body = response.text().await.context("Failed to read response body")?;
        let short = body.trim().to_string();

        // Providers report errors as plain text with a 200, so the body
        // must look like a URL to count
        if !short.starts_with("http") {
            anyhow::bail!("Shortener returned non-URL body: {}", short);
        }

        Ok(short)
    }
}

#[async_trait]
impl Shorten for UrlShortener {
    async fn shorten(&self, long_url: &str) -> String {
        let encoded = urlencoding::encode(long_url);

        let tinyurl_api = format!("{}/api-create.php?url={}", self.tinyurl_base, encoded);
        match self.try_provider(&tinyurl_api).await {
            Ok(short) => {
                info!("TinyURL success: {}", short);
                return short;
            }
            Err(e) => warn!("TinyURL failed: {}. Trying is.gd.", e),
        }

        let isgd_api = format!("{}/create.php?format=simple&url={}", self.isgd_base, encoded);
        match self.try_provider(&isgd_api).await {
            Ok(short) => {
                info!("is.gd success: {}", short);
                return short;
            }
            Err(e) => warn!("is.gd failed: {}. Falling back to original URL.", e),
        }

        info!("All URL shorteners failed. Returning original URL.");
        long_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LONG_URL: &str = "https://amazon.in/dp/B08N5WRWNW?tag=budgetlooks08-21";

    fn make_shortener(tinyurl: &MockServer, isgd: &MockServer) -> UrlShortener {
        UrlShortener::with_base_urls(tinyurl.uri(), isgd.uri(), 5).unwrap()
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let tinyurl = MockServer::start().await;
        let isgd = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-create.php"))
            .and(query_param("url", LONG_URL))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://tinyurl.com/abc123"))
            .mount(&tinyurl)
            .await;

        let shortener = make_shortener(&tinyurl, &isgd);
        let short = shortener.shorten(LONG_URL).await;
        assert_eq!(short, "https://tinyurl.com/abc123");

        // is.gd must not have been called
        assert!(isgd.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_to_second_provider() {
        let tinyurl = MockServer::start().await;
        let isgd = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-create.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&tinyurl)
            .await;

        Mock::given(method("GET"))
            .and(path("/create.php"))
            .and(query_param("format", "simple"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://is.gd/xyz789"))
            .mount(&isgd)
            .await;

        let shortener = make_shortener(&tinyurl, &isgd);
        let short = shortener.shorten(LONG_URL).await;
        assert_eq!(short, "https://is.gd/xyz789");
    }

    #[tokio::test]
    async fn test_non_url_body_counts_as_failure() {
        let tinyurl = MockServer::start().await;
        let isgd = MockServer::start().await;

        // 200 with an error message body
        Mock::given(method("GET"))
            .and(path("/api-create.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Error: invalid URL"))
            .mount(&tinyurl)
            .await;

        Mock::given(method("GET"))
            .and(path("/create.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://is.gd/ok1"))
            .mount(&isgd)
            .await;

        let shortener = make_shortener(&tinyurl, &isgd);
        let short = shortener.shorten(LONG_URL).await;
        assert_eq!(short, "https://is.gd/ok1");
    }

    #[tokio::test]
    async fn test_both_providers_fail_returns_original() {
        let tinyurl = MockServer::start().await;
        let isgd = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-create.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&tinyurl)
            .await;

        Mock::given(method("GET"))
            .and(path("/create.php"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&isgd)
            .await;

        let shortener = make_shortener(&tinyurl, &isgd);
        let short = shortener.shorten(LONG_URL).await;
        assert_eq!(short, LONG_URL);
    }

    #[tokio::test]
    async fn test_trims_whitespace_from_body() {
        let tinyurl = MockServer::start().await;
        let isgd = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api-create.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("https://tinyurl.com/abc\n"))
            .mount(&tinyurl)
            .await;

        let shortener = make_shortener(&tinyurl, &isgd);
        let short = shortener.shorten(LONG_URL).await;
        assert_eq!(short, "https://tinyurl.com/abc");
    }
}
