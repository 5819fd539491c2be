//! Configuration for news fetching and analysis

use crate::error::{NewsError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the NewsAPI key
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
/// Environment variable holding the NewsData.io key
pub const NEWSDATA_API_KEY_VAR: &str = "NEWSDATAIO_API_KEY";
/// Environment variables holding the Gemini key, in lookup order
pub const GEMINI_API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Configuration for news fetching and analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// NewsAPI key (global headlines)
    pub news_api_key: Option<String>,

    /// NewsData.io key (India-focused headlines)
    pub newsdata_api_key: Option<String>,

    /// Gemini key used by the chatbot
    pub gemini_api_key: Option<String>,

    /// NewsAPI base URL
    pub newsapi_base_url: String,

    /// NewsData.io base URL
    pub newsdata_base_url: String,

    /// Country filter for NewsData.io
    pub newsdata_country: String,

    /// Articles requested per source
    pub page_size: usize,

    /// Requests per minute allowed against each news API
    pub rate_limit_per_minute: u32,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Flat file the last fetch is written to
    pub cache_file: PathBuf,

    /// How long a fetch for the same category/language is reused
    pub fetch_ttl: Duration,

    /// Model used by the chatbot
    pub chat_model: String,

    /// Fixed topic count; `None` picks one from the corpus size
    pub n_topics: Option<usize>,

    /// Rolling window for trend detection
    pub trend_window: usize,

    /// A count above `rolling mean × spike_factor` is flagged
    pub spike_factor: f64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            newsdata_api_key: None,
            gemini_api_key: None,
            newsapi_base_url: "https://newsapi.org".to_string(),
            newsdata_base_url: "https://newsdata.io".to_string(),
            newsdata_country: "in".to_string(),
            page_size: 20,
            rate_limit_per_minute: 60,
            request_timeout: Duration::from_secs(30),
            cache_file: PathBuf::from("data/news_cache.json"),
            fetch_ttl: Duration::from_secs(300), // 5 minutes
            chat_model: "gemini-flash-latest".to_string(),
            n_topics: None,
            trend_window: 3,
            spike_factor: 1.5,
        }
    }
}

impl NewsConfig {
    /// Create a new configuration builder
    pub fn builder() -> NewsConfigBuilder {
        NewsConfigBuilder::default()
    }

    /// Fill unset API keys from the environment
    pub fn with_env_keys(mut self) -> Self {
        if self.news_api_key.is_none() {
            self.news_api_key = pulse_utils::env_var(NEWS_API_KEY_VAR);
        }
        if self.newsdata_api_key.is_none() {
            self.newsdata_api_key = pulse_utils::env_var(NEWSDATA_API_KEY_VAR);
        }
        if self.gemini_api_key.is_none() {
            self.gemini_api_key = pulse_utils::first_env_var(&GEMINI_API_KEY_VARS);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(NewsError::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(NewsError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.trend_window == 0 {
            return Err(NewsError::Config(
                "trend_window must be greater than 0".to_string(),
            ));
        }

        if !(self.spike_factor.is_finite() && self.spike_factor > 0.0) {
            return Err(NewsError::Config(
                "spike_factor must be a positive number".to_string(),
            ));
        }

        if self.n_topics == Some(0) {
            return Err(NewsError::Config(
                "n_topics must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether at least one news source can be queried
    pub fn has_news_source(&self) -> bool {
        self.news_api_key.is_some() || self.newsdata_api_key.is_some()
    }
}

/// Builder for NewsConfig
#[derive(Debug, Default)]
pub struct NewsConfigBuilder {
    news_api_key: Option<String>,
    newsdata_api_key: Option<String>,
    gemini_api_key: Option<String>,
    newsapi_base_url: Option<String>,
    newsdata_base_url: Option<String>,
    newsdata_country: Option<String>,
    page_size: Option<usize>,
    rate_limit_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
    cache_file: Option<PathBuf>,
    fetch_ttl: Option<Duration>,
    chat_model: Option<String>,
    n_topics: Option<usize>,
    trend_window: Option<usize>,
    spike_factor: Option<f64>,
    from_env: bool,
}

impl NewsConfigBuilder {
    /// Set the NewsAPI key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the NewsData.io key
    pub fn newsdata_api_key(mut self, key: impl Into<String>) -> Self {
        self.newsdata_api_key = Some(key.into());
        self
    }

    /// Set the Gemini key
    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    /// Override the NewsAPI base URL
    pub fn newsapi_base_url(mut self, url: impl Into<String>) -> Self {
        self.newsapi_base_url = Some(url.into());
        self
    }

    /// Override the NewsData.io base URL
    pub fn newsdata_base_url(mut self, url: impl Into<String>) -> Self {
        self.newsdata_base_url = Some(url.into());
        self
    }

    /// Set the NewsData.io country filter
    pub fn newsdata_country(mut self, country: impl Into<String>) -> Self {
        self.newsdata_country = Some(country.into());
        self
    }

    /// Set articles requested per source
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set per-minute request quota
    pub fn rate_limit_per_minute(mut self, rate: u32) -> Self {
        self.rate_limit_per_minute = Some(rate);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the cache file path
    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    /// Set how long a fetch is reused
    pub fn fetch_ttl(mut self, duration: Duration) -> Self {
        self.fetch_ttl = Some(duration);
        self
    }

    /// Set the chatbot model
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Fix the number of topics
    pub fn n_topics(mut self, n: usize) -> Self {
        self.n_topics = Some(n);
        self
    }

    /// Set the rolling window for trend detection
    pub fn trend_window(mut self, window: usize) -> Self {
        self.trend_window = Some(window);
        self
    }

    /// Set the spike factor
    pub fn spike_factor(mut self, factor: f64) -> Self {
        self.spike_factor = Some(factor);
        self
    }

    /// Load unset API keys from the environment at build time
    pub fn with_env_keys(mut self) -> Self {
        self.from_env = true;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<NewsConfig> {
        let defaults = NewsConfig::default();

        let mut config = NewsConfig {
            news_api_key: self.news_api_key,
            newsdata_api_key: self.newsdata_api_key,
            gemini_api_key: self.gemini_api_key,
            newsapi_base_url: self.newsapi_base_url.unwrap_or(defaults.newsapi_base_url),
            newsdata_base_url: self.newsdata_base_url.unwrap_or(defaults.newsdata_base_url),
            newsdata_country: self.newsdata_country.unwrap_or(defaults.newsdata_country),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            cache_file: self.cache_file.unwrap_or(defaults.cache_file),
            fetch_ttl: self.fetch_ttl.unwrap_or(defaults.fetch_ttl),
            chat_model: self.chat_model.unwrap_or(defaults.chat_model),
            n_topics: self.n_topics,
            trend_window: self.trend_window.unwrap_or(defaults.trend_window),
            spike_factor: self.spike_factor.unwrap_or(defaults.spike_factor),
        };

        if self.from_env {
            config = config.with_env_keys();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NewsConfig::default();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.trend_window, 3);
        assert!((config.spike_factor - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.cache_file, PathBuf::from("data/news_cache.json"));
        assert!(config.validate().is_ok());
        assert!(!config.has_news_source());
    }

    #[test]
    fn test_config_builder() {
        let config = NewsConfig::builder()
            .news_api_key("abc")
            .page_size(10)
            .trend_window(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.page_size, 10);
        assert_eq!(config.trend_window, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.has_news_source());
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let result = NewsConfig::builder().trend_window(0).build();
        assert!(matches!(result, Err(NewsError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_spike_factor() {
        let config = NewsConfig {
            spike_factor: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        // SAFETY: test-only env mutation
        unsafe {
            std::env::set_var(NEWS_API_KEY_VAR, "from-env");
        }
        let config = NewsConfig::builder()
            .news_api_key("explicit")
            .with_env_keys()
            .build()
            .unwrap();
        assert_eq!(config.news_api_key.as_deref(), Some("explicit"));
    }
}
