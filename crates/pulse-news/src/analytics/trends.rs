//! Trend detection: per-group counts over time with rolling means and spikes

use crate::config::NewsConfig;
use crate::error::{NewsError, Result};
use crate::model::AnnotatedArticle;
use crate::nlp::SentimentLabel;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What articles are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDimension {
    #[default]
    Topic,
    Category,
}

/// Granularity of the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    /// Calendar day (UTC)
    #[default]
    Day,
    Hour,
    /// The timestamp as published
    Exact,
}

impl DateBucket {
    pub fn truncate(self, at: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => at
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map_or(at, |d| d.and_utc()),
            Self::Hour => at
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(at),
            Self::Exact => at,
        }
    }
}

/// Trend detection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendOptions {
    /// Rows in the trailing rolling window
    pub window: usize,
    /// `article_count > rolling_count × spike_factor` is a spike
    pub spike_factor: f64,
    pub bucket: DateBucket,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            window: 3,
            spike_factor: 1.5,
            bucket: DateBucket::Day,
        }
    }
}

impl TrendOptions {
    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            window: config.trend_window,
            spike_factor: config.spike_factor,
            ..Self::default()
        }
    }

    pub fn with_bucket(mut self, bucket: DateBucket) -> Self {
        self.bucket = bucket;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(NewsError::Analysis {
                stage: "trends",
                reason: "window must be at least 1".to_string(),
            });
        }
        if !(self.spike_factor.is_finite() && self.spike_factor > 0.0) {
            return Err(NewsError::Analysis {
                stage: "trends",
                reason: format!("invalid spike factor {}", self.spike_factor),
            });
        }
        Ok(())
    }
}

/// One row fed into trend detection
#[derive(Debug, Clone, PartialEq)]
pub struct TrendInput {
    pub group: String,
    pub published_at: Option<String>,
    pub sentiment: SentimentLabel,
}

impl TrendInput {
    pub fn new(
        group: impl Into<String>,
        published_at: Option<&str>,
        sentiment: SentimentLabel,
    ) -> Self {
        Self {
            group: group.into(),
            published_at: published_at.map(str::to_string),
            sentiment,
        }
    }

    /// Group an annotated article by topic label or category
    pub fn from_article(article: &AnnotatedArticle, dimension: TrendDimension) -> Self {
        let group = match dimension {
            TrendDimension::Topic => article.topic_label.clone(),
            TrendDimension::Category => article
                .article
                .category
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        };
        Self {
            group,
            published_at: article.article.published_at.clone(),
            sentiment: article.sentiment,
        }
    }
}

/// Aggregated statistics for one (group, bucket)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub group: String,
    pub bucket: DateTime<Utc>,
    pub article_count: usize,
    /// Mean of +1 / 0 / -1 sentiment scores
    pub avg_sentiment: f64,
    pub rolling_count: f64,
    pub rolling_sentiment: f64,
    pub spike_flag: bool,
}

/// Parse the timestamp formats the news APIs send
///
/// RFC 3339 (`2024-05-01T10:00:00Z`), `2024-05-01 10:00:00` and
/// `2024-05-01` are accepted; naive times are taken as UTC.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Bucket rows by (group, date), then add rolling statistics and spike flags
///
/// Rows whose date is missing or unparsable are dropped. Output is sorted by
/// group, then bucket. Rolling means trail over `window` rows of the same
/// group and use however many rows exist at the start of a group.
pub fn detect_trends(rows: &[TrendInput], options: &TrendOptions) -> Result<Vec<TrendPoint>> {
    options.validate()?;

    let mut buckets: BTreeMap<(&str, DateTime<Utc>), (usize, f64)> = BTreeMap::new();
    for row in rows {
        let Some(at) = row.published_at.as_deref().and_then(parse_published_at) else {
            continue;
        };
        let entry = buckets
            .entry((row.group.as_str(), options.bucket.truncate(at)))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.sentiment.score();
    }

    let mut points: Vec<TrendPoint> = Vec::with_capacity(buckets.len());
    let mut group_start = 0;

    for ((group, bucket), (count, sentiment_sum)) in buckets {
        if points.last().is_some_and(|p: &TrendPoint| p.group != group) {
            group_start = points.len();
        }

        let from = group_start.max((points.len() + 1).saturating_sub(options.window));
        let history = &points[from..];
        let n = (history.len() + 1) as f64;
        let avg_sentiment = sentiment_sum / count as f64;
        let rolling_count =
            (history.iter().map(|p| p.article_count as f64).sum::<f64>() + count as f64) / n;
        let rolling_sentiment =
            (history.iter().map(|p| p.avg_sentiment).sum::<f64>() + avg_sentiment) / n;

        points.push(TrendPoint {
            group: group.to_string(),
            bucket,
            article_count: count,
            avg_sentiment,
            rolling_count,
            rolling_sentiment,
            spike_flag: count as f64 > rolling_count * options.spike_factor,
        });
    }

    Ok(points)
}
