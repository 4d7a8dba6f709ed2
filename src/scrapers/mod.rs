//! Scraping pipeline building blocks.

pub mod http_client;
pub mod rate_limiter;

pub use http_client::HttpClient;
pub use rate_limiter::{RateLimitConfig, RateLimiter};

use serde::{Deserialize, Serialize};

/// Scraped payload for a single URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Extracted page or document text.
    pub content: String,
    /// URLs discovered while scraping this page.
    #[serde(default)]
    pub discovered_urls: Vec<String>,
    /// Page metadata (url, title, content type, ...).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ScrapeResult {
    /// Create a result holding extracted content only.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}
