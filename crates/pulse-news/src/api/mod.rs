//! News API clients and the language-aware aggregator

pub mod newsapi;
pub mod newsdata;

pub use newsapi::NewsApiClient;
pub use newsdata::NewsDataClient;

use crate::cache::{FetchKey, FetchMemo, NewsCache};
use crate::catalog::{ExtendedCategory, SourceRoute};
use crate::config::NewsConfig;
use crate::error::{NewsError, Result};
use crate::model::Article;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

pub(crate) fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

pub(crate) fn build_http_client(config: &NewsConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!("newspulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(NewsError::from)
}

/// Fetches from whichever sources serve the requested language
///
/// English and Hindi go to both APIs, other Indian languages to NewsData.io,
/// everything else to NewsAPI. Every fetch overwrites the flat cache file.
pub struct NewsAggregator {
    newsapi: Option<NewsApiClient>,
    newsdata: Option<NewsDataClient>,
    cache: NewsCache,
    memo: FetchMemo,
    page_size: usize,
    country: String,
}

impl NewsAggregator {
    /// Build clients for every source that has an API key
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let newsapi = config
            .news_api_key
            .as_ref()
            .map(|key| NewsApiClient::with_config(key.clone(), config))
            .transpose()?;
        let newsdata = config
            .newsdata_api_key
            .as_ref()
            .map(|key| NewsDataClient::with_config(key.clone(), config))
            .transpose()?;

        if newsapi.is_none() && newsdata.is_none() {
            warn!("No news API keys configured; fetches will return nothing");
        }

        Ok(Self {
            newsapi,
            newsdata,
            cache: NewsCache::new(&config.cache_file),
            memo: FetchMemo::new(config.fetch_ttl),
            page_size: config.page_size,
            country: config.newsdata_country.clone(),
        })
    }

    /// The cache file this aggregator writes
    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    /// Fetch news for a category and language, reusing a recent fetch
    pub async fn get_all_news(
        &self,
        category: ExtendedCategory,
        language: &str,
    ) -> Result<Vec<Article>> {
        self.get_all_news_with(category, language, false).await
    }

    /// Fetch news; `refresh` skips the in-memory memo
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_all_news_with(
        &self,
        category: ExtendedCategory,
        language: &str,
        refresh: bool,
    ) -> Result<Vec<Article>> {
        let key = FetchKey::new(category, language);
        if !refresh {
            if let Some(articles) = self.memo.get(&key).await {
                info!(count = articles.len(), "Reusing recent fetch");
                return Ok(articles);
            }
        }

        let route = SourceRoute::for_language(language);
        let (from_newsapi, from_newsdata) = tokio::join!(
            self.fetch_newsapi(route, category, language),
            self.fetch_newsdata(route, category, language),
        );

        let mut combined = from_newsapi;
        combined.extend(from_newsdata);
        // Every article carries the requested category label
        let label = category.label().to_lowercase();
        for article in &mut combined {
            article.category = Some(label.clone());
        }
        info!(count = combined.len(), ?route, "Fetched news");

        self.cache.store(&combined).await?;
        self.memo.insert(key, combined.clone()).await;
        Ok(combined)
    }

    async fn fetch_newsapi(
        &self,
        route: SourceRoute,
        category: ExtendedCategory,
        language: &str,
    ) -> Vec<Article> {
        if !route.uses_newsapi() {
            return Vec::new();
        }
        let Some(client) = &self.newsapi else {
            warn!("NEWS_API_KEY not set; skipping NewsAPI");
            return Vec::new();
        };
        client
            .fetch(category.newsapi_category(), language, self.page_size)
            .await
            .unwrap_or_else(|e| {
                warn!("NewsAPI fetch failed: {e}");
                Vec::new()
            })
    }

    async fn fetch_newsdata(
        &self,
        route: SourceRoute,
        category: ExtendedCategory,
        language: &str,
    ) -> Vec<Article> {
        if !route.uses_newsdata() {
            return Vec::new();
        }
        let Some(client) = &self.newsdata else {
            warn!("NEWSDATAIO_API_KEY not set; skipping NewsData.io");
            return Vec::new();
        };
        client
            .fetch(
                &self.country,
                language,
                category.newsdata_category(),
                self.page_size,
            )
            .await
            .unwrap_or_else(|e| {
                warn!("NewsData.io fetch failed: {e}");
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_sources(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "articles": [{"source": {"name": "BBC"}, "title": "Global headline",
                              "description": "d", "publishedAt": "2024-05-01T00:00:00Z"}]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/1/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "results": [{"title": "Indian headline", "pubDate": "2024-05-01 09:00:00",
                             "source_id": "ndtv", "category": ["top"]}]
            })))
            .mount(server)
            .await;
    }

    fn aggregator(server: &MockServer, dir: &tempfile::TempDir) -> NewsAggregator {
        let config = NewsConfig::builder()
            .news_api_key("a")
            .newsdata_api_key("b")
            .newsapi_base_url(server.uri())
            .newsdata_base_url(server.uri())
            .rate_limit_per_minute(1000)
            .cache_file(dir.path().join("data/news_cache.json"))
            .build()
            .unwrap();
        NewsAggregator::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_english_uses_both_sources_and_writes_cache() {
        let server = MockServer::start().await;
        mount_sources(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let aggregator = aggregator(&server, &dir);

        let articles = aggregator
            .get_all_news(ExtendedCategory::Business, "en")
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].provider, NewsProvider::NewsApi);
        assert_eq!(articles[1].provider, NewsProvider::NewsData);
        assert_eq!(articles[0].category.as_deref(), Some("business"));
        assert_eq!(articles[1].category.as_deref(), Some("business"));
        assert_eq!(articles[1].source.as_deref(), Some("ndtv"));

        let cached = aggregator.cache().load().await.unwrap();
        assert_eq!(cached, articles);
    }

    #[tokio::test]
    async fn test_routing_by_language() {
        let server = MockServer::start().await;
        mount_sources(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let aggregator = aggregator(&server, &dir);

        let tamil = aggregator
            .get_all_news(ExtendedCategory::Sports, "ta")
            .await
            .unwrap();
        assert!(tamil.iter().all(|a| a.provider == NewsProvider::NewsData));

        let french = aggregator
            .get_all_news(ExtendedCategory::Sports, "fr")
            .await
            .unwrap();
        assert!(french.iter().all(|a| a.provider == NewsProvider::NewsApi));
        assert!(french.iter().all(|a| a.language == "fr"));
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "results": [{"title": "Still here"}]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let articles = aggregator(&server, &dir)
            .get_all_news(ExtendedCategory::General, "hi")
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Still here");
    }

    #[tokio::test]
    async fn test_memo_reuses_recent_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok", "articles": [{"title": "Once"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let aggregator = aggregator(&server, &dir);

        aggregator.get_all_news(ExtendedCategory::Health, "de").await.unwrap();
        aggregator.get_all_news(ExtendedCategory::Health, "de").await.unwrap();
        aggregator
            .get_all_news_with(ExtendedCategory::Health, "de", true)
            .await
            .unwrap();
    }
}
