//! NewsAPI client (global top headlines)

use super::{SharedRateLimiter, build_http_client, rate_limiter};
use crate::config::NewsConfig;
use crate::error::{NewsError, Result};
use crate::model::{Article, NewsProvider};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Top-headlines response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    code: Option<String>,
    message: Option<String>,
}

/// Article as NewsAPI sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

impl NewsApiArticle {
    /// description→content, content→content_full, publishedAt→published_at,
    /// source.name→source
    fn normalize(self, language: &str) -> Article {
        Article {
            title: self.title.unwrap_or_default(),
            content: self.description,
            content_full: self.content,
            published_at: self.published_at,
            url: self.url,
            author: self.author,
            source: self.source.and_then(|s| s.name),
            language: language.to_string(),
            category: None,
            provider: NewsProvider::NewsApi,
        }
    }
}

/// NewsAPI client
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    /// Create a client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - NewsAPI key
    /// * `rate_limit` - Requests per minute
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Result<Self> {
        Self::with_config(api_key, &NewsConfig {
            rate_limit_per_minute: rate_limit,
            ..NewsConfig::default()
        })
    }

    /// Create a client using base URL, timeout and quota from `config`
    pub fn with_config(api_key: impl Into<String>, config: &NewsConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            api_key: api_key.into(),
            base_url: config.newsapi_base_url.trim_end_matches('/').to_string(),
            rate_limiter: rate_limiter(config.rate_limit_per_minute),
        })
    }

    /// Fetch top headlines
    ///
    /// An envelope whose status is not `ok` yields no articles.
    ///
    /// # Arguments
    /// * `category` - NewsAPI category (business, general, ...)
    /// * `language` - ISO 639-1 code
    /// * `page_size` - Maximum articles to return
    #[instrument(skip(self), fields(provider = "newsapi"))]
    pub async fn fetch(
        &self,
        category: &str,
        language: &str,
        page_size: usize,
    ) -> Result<Vec<Article>> {
        self.rate_limiter.until_ready().await;

        let page_size = page_size.to_string();
        let response = self
            .client
            .get(format!("{}/v2/top-headlines", self.base_url))
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("category", category),
                ("language", language),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NewsError::Api(format!("NewsAPI request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NewsError::RateLimitExceeded {
                provider: "newsapi".to_string(),
            });
        }

        let body = response.text().await?;
        let envelope: NewsApiResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(NewsError::Api(format!(
                    "Failed to parse NewsAPI response: {e}"
                )));
            }
            Err(_) => {
                return Err(NewsError::Api(format!("NewsAPI error {status}: {body}")));
            }
        };

        if envelope.status != "ok" {
            warn!(
                code = envelope.code.as_deref().unwrap_or("unknown"),
                "NewsAPI returned status '{}': {}",
                envelope.status,
                envelope.message.as_deref().unwrap_or("")
            );
            return Ok(Vec::new());
        }

        let articles: Vec<Article> = envelope
            .articles
            .into_iter()
            .map(|a| a.normalize(language))
            .collect();
        debug!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}
