//! NewsData.io client (India-focused news)

use super::{SharedRateLimiter, build_http_client, rate_limiter};
use crate::config::NewsConfig;
use crate::error::{NewsError, Result};
use crate::model::{Article, NewsProvider};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Upper bound on pages walked for one fetch
const MAX_PAGES: usize = 10;

/// Latest-news response envelope
///
/// On errors `results` is an object with `message`/`code` instead of a list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsDataResponse {
    status: String,
    #[serde(default)]
    results: Value,
    next_page: Option<String>,
}

/// Article as NewsData.io sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsDataArticle {
    title: Option<String>,
    link: Option<String>,
    creator: Option<Vec<String>>,
    description: Option<String>,
    content: Option<String>,
    pub_date: Option<String>,
    #[serde(rename = "source_id")]
    source_id: Option<String>,
    category: Option<Vec<String>>,
}

impl NewsDataArticle {
    /// pubDate→published_at, link→url, source_id→source, creator→author
    fn normalize(self, language: &str) -> Article {
        let content = self
            .content
            .filter(|c| !c.trim().is_empty() && !c.starts_with("ONLY AVAILABLE IN PAID"))
            .or_else(|| self.description.clone());

        Article {
            title: self.title.unwrap_or_default(),
            content,
            content_full: None,
            published_at: self.pub_date,
            url: self.link,
            author: self
                .creator
                .filter(|c| !c.is_empty())
                .map(|c| c.join(", ")),
            source: self.source_id,
            language: language.to_string(),
            category: self.category.and_then(|c| c.into_iter().next()),
            provider: NewsProvider::NewsData,
        }
    }
}

/// NewsData.io client
pub struct NewsDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsDataClient {
    /// Create a client with rate limiting
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
            base_url: config.newsdata_base_url.trim_end_matches('/').to_string(),
            rate_limiter: rate_limiter(config.rate_limit_per_minute),
        })
    }

    /// Fetch up to `page_size` articles, following `nextPage` cursors
    ///
    /// # Arguments
    /// * `country` - ISO 3166 country code (e.g. "in")
    /// * `language` - ISO 639-1 code
    /// * `category` - NewsData.io category
    /// * `page_size` - Maximum articles to return
    #[instrument(skip(self), fields(provider = "newsdata"))]
    pub async fn fetch(
        &self,
        country: &str,
        language: &str,
        category: &str,
        page_size: usize,
    ) -> Result<Vec<Article>> {
        let mut collected: Vec<NewsDataArticle> = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 0..MAX_PAGES {
            if collected.len() >= page_size {
                break;
            }

            let envelope = self.fetch_page(country, language, category, cursor.as_deref()).await?;

            if envelope.status != "success" {
                let message = envelope
                    .results
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                if page == 0 {
                    return Err(NewsError::Api(format!("NewsData.io error: {message}")));
                }
                warn!("NewsData.io stopped paging: {message}");
                break;
            }

            let results: Vec<NewsDataArticle> = match envelope.results {
                Value::Array(_) => serde_json::from_value(envelope.results)?,
                _ => Vec::new(),
            };
            if results.is_empty() {
                break;
            }
            debug!(page, count = results.len(), "NewsData.io page received");
            collected.extend(results);

            match envelope.next_page {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        collected.truncate(page_size);
        Ok(collected
            .into_iter()
            .map(|a| a.normalize(language))
            .collect())
    }

    async fn fetch_page(
        &self,
        country: &str,
        language: &str,
        category: &str,
        cursor: Option<&str>,
    ) -> Result<NewsDataResponse> {
        self.rate_limiter.until_ready().await;

        let mut query = vec![
            ("apikey", self.api_key.as_str()),
            ("country", country),
            ("language", language),
            ("category", category),
        ];
        if let Some(cursor) = cursor {
            query.push(("page", cursor));
        }

        let response = self
            .client
            .get(format!("{}/api/1/news", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| NewsError::Api(format!("NewsData.io request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NewsError::RateLimitExceeded {
                provider: "newsdata".to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                NewsError::Api(format!("Failed to parse NewsData.io response: {e}"))
            } else {
                NewsError::Api(format!("NewsData.io error {status}: {body}"))
            }
        })
    }
}
