//! Flat-file cache of the last fetch, plus an in-memory fetch memo

use crate::catalog::ExtendedCategory;
use crate::error::Result;
use crate::model::Article;
use cached::{Cached, TimedCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// JSON file holding the most recent fetch
///
/// Every store overwrites the file; there is no history.
#[derive(Debug, Clone)]
pub struct NewsCache {
    path: PathBuf,
}

impl NewsCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the cache file with `articles`, creating parent directories
    pub async fn store(&self, articles: &[Article]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(articles)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), count = articles.len(), "Cache written");
        Ok(())
    }

    /// Read the cache file back; a missing file is an empty cache
    pub async fn load(&self) -> Result<Vec<Article>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Memo key for one aggregator request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub category: ExtendedCategory,
    pub language: String,
}

impl FetchKey {
    pub fn new(category: ExtendedCategory, language: impl Into<String>) -> Self {
        Self {
            category,
            language: language.into(),
        }
    }
}

/// Recent fetches kept for a fixed lifespan
#[derive(Clone)]
pub struct FetchMemo {
    cache: Arc<RwLock<TimedCache<FetchKey, Vec<Article>>>>,
}

impl FetchMemo {
    /// Create a memo with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &FetchKey) -> Option<Vec<Article>> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: FetchKey, articles: Vec<Article>) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, articles);
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsProvider;

    fn sample() -> Vec<Article> {
        let mut hindi = Article::new("शेयर बाज़ार में तेज़ी", NewsProvider::NewsData);
        hindi.language = "hi".to_string();
        vec![Article::new("Markets rally", NewsProvider::NewsApi), hindi]
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NewsCache::new(dir.path().join("nested/data/news_cache.json"));

        cache.store(&sample()).await.unwrap();
        let loaded = cache.load().await.unwrap();
        assert_eq!(loaded, sample());

        // Non-ASCII text is written as-is
        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert!(raw.contains("शेयर"));
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NewsCache::new(dir.path().join("news_cache.json"));

        cache.store(&sample()).await.unwrap();
        cache.store(&[]).await.unwrap();
        assert!(cache.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NewsCache::new(dir.path().join("absent.json"));
        assert!(cache.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memo_insert_get_clear() {
        let memo = FetchMemo::new(Duration::from_secs(60));
        let key = FetchKey::new(ExtendedCategory::Sports, "en");

        assert!(memo.get(&key).await.is_none());
        memo.insert(key.clone(), sample()).await;
        assert_eq!(memo.get(&key).await.map(|a| a.len()), Some(2));
        assert!(memo.get(&FetchKey::new(ExtendedCategory::Sports, "hi")).await.is_none());

        memo.clear().await;
        assert!(memo.is_empty().await);
    }
}
