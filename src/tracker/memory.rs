//! In-memory URL tracking store.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::UrlTracker;
use crate::error::Result;

#[derive(Debug, Default)]
struct TrackerState {
    /// FIFO queue of URLs waiting to be fetched.
    pool: VecDeque<String>,
    /// Membership index over `pool`.
    pooled: HashSet<String>,
    /// URLs that have been fetched.
    visited: HashSet<String>,
}

/// URL tracker keeping the pool and visited set in process memory.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrlTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl MemoryUrlTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a URL to the pool unless it is already pooled or visited.
    ///
    /// Returns true if the URL was enqueued.
    pub async fn add_url(&self, url: &str) -> bool {
        let mut state = self.state.write().await;
        if state.visited.contains(url) || state.pooled.contains(url) {
            return false;
        }
        state.pool.push_back(url.to_string());
        state.pooled.insert(url.to_string());
        true
    }

    /// Add many URLs, returning how many were actually enqueued.
    pub async fn add_urls<I>(&self, urls: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut state = self.state.write().await;
        let mut added = 0;
        for url in urls {
            let url = url.as_ref();
            if state.visited.contains(url) || state.pooled.contains(url) {
                continue;
            }
            state.pool.push_back(url.to_string());
            state.pooled.insert(url.to_string());
            added += 1;
        }
        if added > 0 {
            debug!("Enqueued {} new URLs", added);
        }
        added
    }

    /// Take the oldest URL from the pool.
    pub async fn next_url(&self) -> Option<String> {
        let mut state = self.state.write().await;
        let url = state.pool.pop_front()?;
        state.pooled.remove(&url);
        Some(url)
    }

    /// Record a URL as visited.
    pub async fn mark_visited(&self, url: &str) {
        let mut state = self.state.write().await;
        state.visited.insert(url.to_string());
    }
}

#[async_trait]
impl UrlTracker for MemoryUrlTracker {
    async fn get_pool_size(&self) -> Result<u64> {
        Ok(self.state.read().await.pool.len() as u64)
    }

    async fn get_visited_count(&self) -> Result<u64> {
        Ok(self.state.read().await.visited.len() as u64)
    }

    async fn is_pool_empty(&self) -> Result<bool> {
        Ok(self.state.read().await.pool.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_tracker_is_empty() {
        let tracker = MemoryUrlTracker::new();
        assert_eq!(tracker.get_pool_size().await.unwrap(), 0);
        assert_eq!(tracker.get_visited_count().await.unwrap(), 0);
        assert!(tracker.is_pool_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_add_url_dedupes() {
        let tracker = MemoryUrlTracker::new();
        assert!(tracker.add_url("https://a.com/1").await);
        assert!(!tracker.add_url("https://a.com/1").await);
        assert_eq!(tracker.get_pool_size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_visited_urls_are_not_repooled() {
        let tracker = MemoryUrlTracker::new();
        tracker.add_url("https://a.com/1").await;
        let url = tracker.next_url().await.unwrap();
        tracker.mark_visited(&url).await;

        assert!(!tracker.add_url("https://a.com/1").await);
        assert!(tracker.is_pool_empty().await.unwrap());
        assert_eq!(tracker.get_visited_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_url_is_fifo() {
        let tracker = MemoryUrlTracker::new();
        tracker
            .add_urls(["https://a.com/1", "https://a.com/2", "https://a.com/3"])
            .await;
        assert_eq!(tracker.next_url().await.as_deref(), Some("https://a.com/1"));
        assert_eq!(tracker.next_url().await.as_deref(), Some("https://a.com/2"));
        assert_eq!(tracker.next_url().await.as_deref(), Some("https://a.com/3"));
        assert_eq!(tracker.next_url().await, None);
    }

    #[tokio::test]
    async fn test_add_urls_counts_new_entries_only() {
        let tracker = MemoryUrlTracker::new();
        tracker.add_url("https://a.com/1").await;
        let added = tracker
            .add_urls(["https://a.com/1", "https://a.com/2"])
            .await;
        assert_eq!(added, 1);
        assert_eq!(tracker.get_pool_size().await.unwrap(), 2);
    }
}
