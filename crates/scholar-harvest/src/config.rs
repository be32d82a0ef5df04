//! Configuration for fetching, classification and retry behaviour.

use std::time::Duration;

use reqwest_retry::Jitter;
use reqwest_retry::policies::ExponentialBackoff;

/// Default values used when nothing is configured.
pub mod defaults {
    use std::time::Duration;

    /// Google Scholar host, used to absolutise relative listing links.
    pub const SCHOLAR_BASE_URL: &str = "https://scholar.google.com";

    /// OpenAI-compatible chat completions endpoint (Groq by default).
    pub const MODEL_API_URL: &str = "https://api.groq.com/openai/v1";

    /// Model used for venue classification.
    pub const MODEL_NAME: &str = "llama-3.1-8b-instant";

    /// Request timeout for a single listing page.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Upper bound on waiting for the next page before pagination stops.
    pub const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Pause between consecutive page requests.
    pub const PAGE_DELAY: Duration = Duration::from_secs(2);

    /// Rows requested per listing page (Scholar caps this at 100).
    pub const PAGE_SIZE: u32 = 100;

    /// Hard stop for pagination.
    pub const MAX_PAGES: u32 = 50;

    /// Model request timeout.
    pub const MODEL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Model requests allowed per minute.
    pub const MODEL_REQUESTS_PER_MINUTE: u32 = 30;

    /// Total attempts per classification call (first try included).
    pub const RETRY_MAX_ATTEMPTS: u32 = 3;

    /// Shortest wait between classification attempts.
    pub const RETRY_MIN_BACKOFF: Duration = Duration::from_secs(4);

    /// Longest wait between classification attempts.
    pub const RETRY_MAX_BACKOFF: Duration = Duration::from_secs(10);

    /// Concurrent classification calls.
    pub const CLASSIFY_CONCURRENCY: usize = 4;

    /// Browser-like user agent; listing sites reject obvious bots.
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) scholar-harvest";
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, first try included. Zero is treated as one.
    pub max_attempts: u32,

    /// Wait before the second attempt.
    pub min_backoff: Duration,

    /// Cap for any single wait.
    pub max_backoff: Duration,

    /// Randomise waits within the bounds.
    pub jitter: bool,
}

impl RetryConfig {
    /// A policy that retries immediately (for tests).
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: false,
        }
    }

    /// Attempts actually made, never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Build the backoff schedule.
    #[must_use]
    pub fn backoff(&self) -> ExponentialBackoff {
        let max = self.max_backoff.max(self.min_backoff);
        ExponentialBackoff::builder()
            .retry_bounds(self.min_backoff, max)
            .jitter(if self.jitter {
                Jitter::Bounded
            } else {
                Jitter::None
            })
            .build_with_max_retries(self.attempts() - 1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            min_backoff: defaults::RETRY_MIN_BACKOFF,
            max_backoff: defaults::RETRY_MAX_BACKOFF,
            jitter: true,
        }
    }
}

/// Listing page fetch settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Bounded wait for each page.
    pub page_timeout: Duration,

    /// Delay between page requests.
    pub page_delay: Duration,

    /// Rows per page.
    pub page_size: u32,

    /// Maximum number of pages per profile.
    pub max_pages: u32,

    /// Transport retries performed by the HTTP middleware.
    pub transport_retries: u32,

    /// User agent header.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            page_timeout: defaults::PAGE_TIMEOUT,
            page_delay: defaults::PAGE_DELAY,
            page_size: defaults::PAGE_SIZE,
            max_pages: defaults::MAX_PAGES,
            transport_retries: 2,
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

/// Remote classification model settings.
#[derive(Clone)]
pub struct ModelConfig {
    /// API key for the chat completions endpoint.
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended.
    pub api_url: String,

    /// Model name.
    pub model: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Request pacing; `None` disables the limiter.
    pub requests_per_minute: Option<u32>,
}

impl ModelConfig {
    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: defaults::MODEL_API_URL.to_string(),
            model: defaults::MODEL_NAME.to_string(),
            request_timeout: defaults::MODEL_TIMEOUT,
            requests_per_minute: Some(defaults::MODEL_REQUESTS_PER_MINUTE),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("has_api_key", &self.has_api_key())
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Page fetching.
    pub fetch: FetchConfig,

    /// Model tier.
    pub model: ModelConfig,

    /// Retry policy for the model tier.
    pub retry: RetryConfig,

    /// Concurrent classification calls.
    pub classify_concurrency: usize,
}

impl Config {
    /// Create a configuration with an optional model API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            fetch: FetchConfig::default(),
            model: ModelConfig {
                api_key,
                ..ModelConfig::default()
            },
            retry: RetryConfig::default(),
            classify_concurrency: defaults::CLASSIFY_CONCURRENCY,
        }
    }

    /// Create a test configuration pointing every remote at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            fetch: FetchConfig {
                request_timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(2),
                page_timeout: Duration::from_secs(5),
                page_delay: Duration::ZERO,
                page_size: 2,
                max_pages: 10,
                transport_retries: 0,
                user_agent: "scholar-harvest-test".to_string(),
            },
            model: ModelConfig {
                api_key: Some("test-key".to_string()),
                api_url: format!("{base_url}/openai/v1"),
                model: "test-model".to_string(),
                request_timeout: Duration::from_secs(5),
                requests_per_minute: None,
            },
            retry: RetryConfig::immediate(defaults::RETRY_MAX_ATTEMPTS),
            classify_concurrency: 2,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("SCHOLAR_HARVEST_MODEL_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .ok();
        let mut config = Self::new(api_key);

        if let Ok(url) = std::env::var("SCHOLAR_HARVEST_MODEL_URL") {
            url::Url::parse(&url).map_err(|e| {
                anyhow::anyhow!("SCHOLAR_HARVEST_MODEL_URL is not a URL: {e}")
            })?;
            config.model.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("SCHOLAR_HARVEST_MODEL") {
            config.model.model = model;
        }
        if let Ok(rpm) = std::env::var("SCHOLAR_HARVEST_MODEL_RPM") {
            let rpm: u32 = rpm.parse().map_err(|e| {
                anyhow::anyhow!("SCHOLAR_HARVEST_MODEL_RPM must be a number: {e}")
            })?;
            config.model.requests_per_minute = (rpm > 0).then_some(rpm);
        }

        Ok(config)
    }

    /// Check if the model tier can be used.
    #[must_use]
    pub const fn has_model(&self) -> bool {
        self.model.has_api_key()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::new(None);
        assert!(!config.has_model());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.classify_concurrency, defaults::CLASSIFY_CONCURRENCY);
    }

    #[test]
    fn test_config_with_api_key() {
        let config = Config::new(Some("test-key".to_string()));
        assert!(config.has_model());
        assert_eq!(config.model.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_model_config_debug_hides_key() {
        let config = Config::new(Some("super-secret".to_string()));
        let debug = format!("{:?}", config.model);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("has_api_key"));
    }

    #[test]
    fn test_retry_attempts_never_zero() {
        assert_eq!(RetryConfig::immediate(0).attempts(), 1);
        assert_eq!(RetryConfig::immediate(3).attempts(), 3);
    }

    #[test]
    fn test_testing_config_has_no_delays() {
        let config = Config::for_testing("http://127.0.0.1:9");
        assert_eq!(config.fetch.page_delay, Duration::ZERO);
        assert_eq!(config.retry.min_backoff, Duration::ZERO);
        assert!(config.model.api_url.starts_with("http://127.0.0.1:9"));
    }
}
