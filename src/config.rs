//! Configuration management for webacquire.
//!
//! Settings come from `webacquire.toml` when present, with environment
//! variables taking precedence. Loaded settings are passed explicitly into
//! constructors; nothing reads configuration ambiently at request time.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scrapers::RateLimitConfig;

/// Config file discovered in the working directory when no path is given.
pub const CONFIG_FILE: &str = "webacquire.toml";

/// Default minimum delay between same-domain requests in seconds.
pub const DEFAULT_RATE_LIMIT_MIN: f64 = 1.0;

/// Default maximum delay between same-domain requests in seconds.
pub const DEFAULT_RATE_LIMIT_MAX: f64 = 3.0;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rate_limit: RateLimitSettings,
    /// Custom user agent for outbound requests.
    pub user_agent: Option<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitSettings::default(),
            user_agent: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Delay bounds for per-domain request spacing, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_delay_secs: DEFAULT_RATE_LIMIT_MIN,
            max_delay_secs: DEFAULT_RATE_LIMIT_MAX,
        }
    }
}

impl RateLimitSettings {
    /// Convert to the limiter's runtime config.
    pub fn to_limiter_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            Duration::from_secs_f64(self.min_delay_secs),
            Duration::from_secs_f64(self.max_delay_secs),
        )
    }
}

impl Settings {
    /// Load settings from `path`, or from `webacquire.toml` in the working
    /// directory if it exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Environment variables: RATE_LIMIT_MIN, RATE_LIMIT_MAX,
    /// WEBACQUIRE_USER_AGENT, WEBACQUIRE_TIMEOUT.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(min) = env_f64("RATE_LIMIT_MIN")? {
            self.rate_limit.min_delay_secs = min;
        }
        if let Some(max) = env_f64("RATE_LIMIT_MAX")? {
            self.rate_limit.max_delay_secs = max;
        }
        if let Ok(ua) = std::env::var("WEBACQUIRE_USER_AGENT") {
            self.user_agent = Some(ua);
        }
        if let Some(timeout) = env_u64("WEBACQUIRE_TIMEOUT")? {
            self.request_timeout_secs = timeout;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let rl = &self.rate_limit;
        if rl.min_delay_secs < 0.0 || rl.min_delay_secs > rl.max_delay_secs {
            return Err(Error::Config(format!(
                "rate limit bounds must satisfy 0 <= min <= max (got min={}, max={})",
                rl.min_delay_secs, rl.max_delay_secs
            )));
        }
        Ok(())
    }

    /// HTTP request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be an integer, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.rate_limit.min_delay_secs, DEFAULT_RATE_LIMIT_MIN);
        assert_eq!(settings.rate_limit.max_delay_secs, DEFAULT_RATE_LIMIT_MAX);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(settings.user_agent.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [rate_limit]
            min_delay_secs = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(settings.rate_limit.min_delay_secs, 0.5);
        assert_eq!(settings.rate_limit.max_delay_secs, DEFAULT_RATE_LIMIT_MAX);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let settings: Settings = toml::from_str(
            r#"
            [rate_limit]
            min_delay_secs = 5.0
            max_delay_secs = 1.0
            "#,
        )
        .unwrap();
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_to_limiter_config() {
        let settings = RateLimitSettings {
            min_delay_secs: 0.2,
            max_delay_secs: 0.2,
        };
        let config = settings.to_limiter_config();
        assert_eq!(config.min_delay, Duration::from_millis(200));
        assert_eq!(config.max_delay, Duration::from_millis(200));
    }
}
