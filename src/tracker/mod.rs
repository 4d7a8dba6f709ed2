//! Shared scrape-progress state: the URL pool and visited set.
//!
//! The tracking store itself is owned elsewhere in the pipeline; this module
//! defines its read surface and a point-in-time progress snapshot over it.

mod memory;

pub use memory::MemoryUrlTracker;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Read surface of the URL tracking store.
#[async_trait]
pub trait UrlTracker: Send + Sync {
    /// Number of URLs waiting in the pool.
    async fn get_pool_size(&self) -> Result<u64>;

    /// Number of URLs already visited.
    async fn get_visited_count(&self) -> Result<u64>;

    /// Whether the pool has no URLs left.
    async fn is_pool_empty(&self) -> Result<bool>;
}

/// Point-in-time view of crawl progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrapeStats {
    pub urls_in_pool: u64,
    pub urls_visited: u64,
    pub is_pool_empty: bool,
}

/// Get current scraping statistics from the tracking store.
///
/// Three independent reads assembled into one value; no atomicity across
/// them. Failures from the store propagate to the caller unmodified.
pub async fn scraping_stats<T: UrlTracker + ?Sized>(tracker: &T) -> Result<ScrapeStats> {
    Ok(ScrapeStats {
        urls_in_pool: tracker.get_pool_size().await?,
        urls_visited: tracker.get_visited_count().await?,
        is_pool_empty: tracker.is_pool_empty().await?,
    })
}
