//! HTTP client for polite page and document fetching.

use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use super::rate_limiter::RateLimiter;
use crate::error::Result;

/// Default user agent for outbound requests.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; webacquire/0.3)";

/// HTTP client that waits out the per-domain rate limit before every request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new HTTP client with its own rate limiter.
    pub fn new(timeout: Duration) -> Self {
        Self::with_rate_limiter(timeout, RateLimiter::new())
    }

    /// Create a new HTTP client sharing an existing rate limiter.
    pub fn with_rate_limiter(timeout: Duration, rate_limiter: RateLimiter) -> Self {
        Self::with_user_agent(timeout, rate_limiter, None)
    }

    /// Create a new HTTP client with a custom user agent.
    pub fn with_user_agent(
        timeout: Duration,
        rate_limiter: RateLimiter,
        user_agent: Option<&str>,
    ) -> Self {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limiter,
        }
    }

    /// Access the shared rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Fetch a URL's body bytes.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.rate_limiter.acquire(url).await;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch document bytes from a URL or a local filesystem path.
    pub async fn document_bytes(&self, source: &str) -> Result<Vec<u8>> {
        if is_http_url(source) {
            self.fetch_bytes(source).await
        } else {
            debug!("Reading document from local path {}", source);
            Ok(tokio::fs::read(Path::new(source)).await?)
        }
    }

    /// HEAD a URL and return its Content-Type header, if any.
    pub async fn content_type(&self, url: &str) -> Result<Option<String>> {
        self.rate_limiter.acquire(url).await;
        let response = self.client.head(url).send().await?;
        Ok(response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()))
    }

    /// Check whether a URL serves image content.
    ///
    /// Transport failures are logged and reported as `false`; callers use
    /// this as a pre-filter, not a guarantee.
    pub async fn is_media_content_type(&self, url: &str) -> bool {
        match self.content_type(url).await {
            Ok(Some(content_type)) => content_type.starts_with("image/"),
            Ok(None) => false,
            Err(e) => {
                error!("Error checking content type for {}: {}", url, e);
                false
            }
        }
    }
}

/// True when `source` is an http(s) URL rather than a local path.
fn is_http_url(source: &str) -> bool {
    match Url::parse(source) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
