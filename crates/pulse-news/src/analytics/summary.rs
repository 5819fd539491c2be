//! Aggregate counts behind the dashboard charts

use super::trends::parse_published_at;
use crate::model::AnnotatedArticle;
use crate::nlp::SentimentLabel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Words shown in the word cloud
pub const DEFAULT_MAX_WORDS: usize = 100;

/// Category used when an article carries none
const UNCATEGORIZED: &str = "unknown";

/// Article count for one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Articles per (day, category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub category: String,
    pub count: usize,
}

/// Everything the charts need, computed once per report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub sentiment: Vec<LabelCount>,
    pub categories: Vec<LabelCount>,
    pub top_words: Vec<LabelCount>,
    pub timeline: Vec<TimelinePoint>,
}

impl ReportSummary {
    pub fn from_articles(articles: &[AnnotatedArticle]) -> Self {
        Self {
            sentiment: sentiment_distribution(articles),
            categories: category_counts(articles),
            top_words: word_frequencies(articles, DEFAULT_MAX_WORDS),
            timeline: timeline(articles),
        }
    }
}

fn ranked(counts: HashMap<String, usize>) -> Vec<LabelCount> {
    let mut ranked: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked
}

/// Count per sentiment label, labels with no articles omitted
pub fn sentiment_distribution(articles: &[AnnotatedArticle]) -> Vec<LabelCount> {
    [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ]
    .into_iter()
    .map(|label| LabelCount {
        label: label.to_string(),
        count: articles.iter().filter(|a| a.sentiment == label).count(),
    })
    .filter(|c| c.count > 0)
    .collect()
}

/// Articles per category, most frequent first
pub fn category_counts(articles: &[AnnotatedArticle]) -> Vec<LabelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for article in articles {
        let category = article
            .article
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *counts.entry(category).or_default() += 1;
    }
    ranked(counts)
}

/// Most frequent tokens across all articles
pub fn word_frequencies(articles: &[AnnotatedArticle], limit: usize) -> Vec<LabelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in articles.iter().flat_map(|a| &a.tokens) {
        if token.chars().count() > 1 && !token.chars().all(char::is_numeric) {
            *counts.entry(token.clone()).or_default() += 1;
        }
    }
    let mut words = ranked(counts);
    words.truncate(limit);
    words
}

/// Article counts by publication day and category
pub fn timeline(articles: &[AnnotatedArticle]) -> Vec<TimelinePoint> {
    let mut counts: BTreeMap<(NaiveDate, String), usize> = BTreeMap::new();
    for article in articles {
        let Some(at) = article
            .article
            .published_at
            .as_deref()
            .and_then(parse_published_at)
        else {
            continue;
        };
        let category = article
            .article
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *counts.entry((at.date_naive(), category)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((date, category), count)| TimelinePoint {
            date,
            category,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, NewsProvider};

    fn annotated(category: &str, date: &str, sentiment: SentimentLabel, tokens: &[&str]) -> AnnotatedArticle {
        let mut article = Article::new("t", NewsProvider::NewsApi);
        article.category = Some(category.to_string());
        article.published_at = Some(date.to_string());
        AnnotatedArticle {
            article,
            cleaned_text: tokens.join(" "),
            tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
            lemmas: Vec::new(),
            sentiment,
            stars: 3,
            sentiment_score: 0.5,
            entities: Vec::new(),
            topic: 0,
            topic_label: "0_t".to_string(),
            topic_probability: 1.0,
        }
    }

    fn sample() -> Vec<AnnotatedArticle> {
        vec![
            annotated("sports", "2024-05-01T09:00:00Z", SentimentLabel::Positive, &["cricket", "win"]),
            annotated("sports", "2024-05-01T18:00:00Z", SentimentLabel::Positive, &["cricket", "2024"]),
            annotated("business", "2024-05-02", SentimentLabel::Negative, &["market", "a"]),
        ]
    }

    #[test]
    fn test_sentiment_distribution() {
        let dist = sentiment_distribution(&sample());
        assert_eq!(
            dist,
            vec![
                LabelCount { label: "Positive".to_string(), count: 2 },
                LabelCount { label: "Negative".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_category_counts_ranked() {
        let counts = category_counts(&sample());
        assert_eq!(counts[0].label, "sports");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].label, "business");
    }

    #[test]
    fn test_word_frequencies_skip_noise() {
        let words = word_frequencies(&sample(), 10);
        assert_eq!(words[0].label, "cricket");
        assert_eq!(words[0].count, 2);
        assert!(words.iter().all(|w| w.label != "2024" && w.label != "a"));

        assert_eq!(word_frequencies(&sample(), 1).len(), 1);
    }

    #[test]
    fn test_timeline_by_day() {
        let points = timeline(&sample());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].category, "sports");
        assert_eq!(points[0].count, 2);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }
}
