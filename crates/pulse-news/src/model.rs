//! Article records shared by every pipeline stage

use crate::nlp::{Entity, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API an article came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsProvider {
    NewsApi,
    NewsData,
}

impl fmt::Display for NewsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewsApi => f.write_str("NewsAPI"),
            Self::NewsData => f.write_str("NewsData.io"),
        }
    }
}

/// A news article with field names normalised across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Headline
    pub title: String,
    /// Short description or summary
    pub content: Option<String>,
    /// Full (often truncated) body when the provider sends one
    pub content_full: Option<String>,
    /// Publication timestamp as sent by the provider
    pub published_at: Option<String>,
    /// Link to the article
    pub url: Option<String>,
    /// Author(s)
    pub author: Option<String>,
    /// Publisher name or id
    pub source: Option<String>,
    /// Language code the article was requested in
    pub language: String,
    /// Category reported by the provider, or the one requested
    pub category: Option<String>,
    /// Originating API
    pub provider: NewsProvider,
}

impl Article {
    /// Create an article with only a title set
    pub fn new(title: impl Into<String>, provider: NewsProvider) -> Self {
        Self {
            title: title.into(),
            content: None,
            content_full: None,
            published_at: None,
            url: None,
            author: None,
            source: None,
            language: crate::catalog::DEFAULT_NEWS_LANGUAGE.to_string(),
            category: None,
            provider,
        }
    }

    /// Title and description joined, the text every NLP stage reads
    pub fn analysis_text(&self) -> String {
        format!("{} {}", self.title, self.content.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}

/// An article after every annotation stage has run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedArticle {
    #[serde(flatten)]
    pub article: Article,
    /// Lowercased text stripped of URLs and punctuation
    pub cleaned_text: String,
    /// Tokens with stopwords removed
    pub tokens: Vec<String>,
    /// Lemmas aligned with `tokens`
    pub lemmas: Vec<String>,
    /// Sentiment label
    pub sentiment: SentimentLabel,
    /// 1-5 star rating behind the label
    pub stars: u8,
    /// Classifier confidence in [0, 1]
    pub sentiment_score: f64,
    /// Named entities found in the raw text
    pub entities: Vec<Entity>,
    /// Topic id, -1 for outliers
    pub topic: i32,
    /// Topic label such as `0_market_stock_rate`
    pub topic_label: String,
    /// Similarity of the article to its topic centroid
    pub topic_probability: f64,
}
