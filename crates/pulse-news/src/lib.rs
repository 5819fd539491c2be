//! News analytics engine
//!
//! This crate turns raw headlines from public news APIs into an analysis
//! report ready to be rendered by a dashboard. It includes:
//!
//! - Language and category catalogs for NewsAPI and NewsData.io
//! - Rate-limited API clients and a language-aware aggregator
//! - A flat JSON cache of the last fetch
//! - Text cleaning, sentiment classification, entity extraction and topic modeling
//! - Trend detection with rolling statistics and cross-category correlation
//! - A chatbot backed by a hosted language model
//!
//! # Pipeline
//!
//! fetch → clean → annotate → aggregate → display. [`NewsAggregator`] covers
//! the first step, [`NewsPipeline`] the next three; rendering lives in the
//! `pulse-web` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_news::{ExtendedCategory, NewsAggregator, NewsConfig, NewsPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = NewsConfig::builder().with_env_keys().build()?;
//!     let aggregator = NewsAggregator::new(&config)?;
//!
//!     let articles = aggregator.get_all_news(ExtendedCategory::Business, "en").await?;
//!     let report = NewsPipeline::from_config(&config).run(articles).await?;
//!
//!     for point in report.spikes() {
//!         println!("{} spiked on {}", point.group, point.bucket);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod nlp;
pub mod pipeline;

// Re-export main types for convenience
pub use analytics::{
    CorrelationMatrix, CorrelationMetric, DateBucket, TrendDimension, TrendOptions, TrendPoint,
    compute_category_correlation, detect_trends,
};
pub use api::{NewsAggregator, NewsApiClient, NewsDataClient};
pub use cache::NewsCache;
pub use catalog::ExtendedCategory;
pub use chat::{ConversationManager, NewsChatbot};
pub use config::NewsConfig;
pub use error::{NewsError, Result};
pub use model::{AnnotatedArticle, Article, NewsProvider};
pub use nlp::{EntityLabel, SentimentLabel};
pub use pipeline::{AnalysisReport, NewsPipeline};
