//! Per-domain rate limiting with randomized request spacing.
//!
//! Tracks the last request time for each domain and spaces consecutive
//! requests to the same domain by a uniform random delay drawn from
//! `[min_delay, max_delay]`. Requests to different domains never wait on
//! each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::config::{DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_MIN};

/// Delay bounds for the limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Minimum delay between requests to the same domain.
    pub min_delay: Duration,
    /// Maximum delay between requests to the same domain.
    pub max_delay: Duration,
}

impl RateLimitConfig {
    /// Create delay bounds. `min_delay` must not exceed `max_delay`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        debug_assert!(min_delay <= max_delay);
        Self {
            min_delay,
            max_delay,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs_f64(DEFAULT_RATE_LIMIT_MIN),
            max_delay: Duration::from_secs_f64(DEFAULT_RATE_LIMIT_MAX),
        }
    }
}

/// Rate limiter that tracks per-domain request timing.
///
/// The ledger maps each domain to the instant of its last request. Entries
/// are created on first use and never evicted; the domain set is bounded by
/// the crawl's targets. Cloning shares the ledger.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    last_request_times: Arc<RwLock<HashMap<String, Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with default delay bounds.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Create a new rate limiter with custom delay bounds.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_request_times: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Extract domain from URL.
    pub fn extract_domain(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
    }

    /// Wait until it is polite to hit `domain` again, then record the request.
    ///
    /// A fresh delay is drawn on every call so request timing stays
    /// unpredictable. A domain with no ledger entry never waits. The ledger
    /// entry is written after the sleep resolves, so the recorded time is the
    /// moment the caller proceeds to act.
    ///
    /// Two concurrent callers for the same domain can both read the same last
    /// request time and land closer together than the drawn delay; the lock
    /// guards the map, not the spacing.
    pub async fn wait(&self, domain: &str) {
        let delay = self.jitter();
        let elapsed = {
            let times = self.last_request_times.read().await;
            times.get(domain).map(Instant::elapsed)
        };

        if let Some(elapsed) = elapsed {
            if elapsed < delay {
                let remaining = delay - elapsed;
                debug!("Rate limiting {}: waiting {:?}", domain, remaining);
                tokio::time::sleep(remaining).await;
            }
        }

        let mut times = self.last_request_times.write().await;
        times.insert(domain.to_string(), Instant::now());
    }

    /// Wait for the domain of `url`, returning the domain that was limited.
    ///
    /// Returns `None` without waiting when the URL has no host.
    pub async fn acquire(&self, url: &str) -> Option<String> {
        let domain = Self::extract_domain(url)?;
        self.wait(&domain).await;
        Some(domain)
    }

    /// Number of domains with a recorded request time.
    pub async fn tracked_domains(&self) -> usize {
        self.last_request_times.read().await.len()
    }

    fn jitter(&self) -> Duration {
        let min = self.config.min_delay.as_secs_f64();
        let max = self.config.max_delay.as_secs_f64();
        Duration::from_secs_f64(rand::rng().random_range(min..=max))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
