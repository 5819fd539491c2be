//! Error types for news fetching and analysis

use thiserror::Error;

/// News pipeline errors
#[derive(Debug, Error)]
pub enum NewsError {
    /// API request failed
    #[error("API error: {0}")]
    Api(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error (cache file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis stage failed
    #[error("Analysis error in {stage}: {reason}")]
    Analysis { stage: &'static str, reason: String },

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(#[from] pulse_llm::LLMError),
}

/// Result type alias for news operations
pub type Result<T> = std::result::Result<T, NewsError>;
