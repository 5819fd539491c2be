//! The analysis pipeline: clean → annotate → aggregate

use crate::analytics::{
    CorrelationMatrix, CorrelationMetric, ReportSummary, TrendDimension, TrendInput, TrendOptions,
    TrendPoint, compute_category_correlation, detect_trends,
};
use crate::config::NewsConfig;
use crate::error::Result;
use crate::model::{AnnotatedArticle, Article};
use crate::nlp::{
    LexiconClassifier, SentimentClassifier, TopicInfo, extract_entities, generate_topics,
    preprocess,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

/// Output of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<AnnotatedArticle>,
    pub topics: Vec<TopicInfo>,
    /// Trends grouped by topic
    pub topic_trends: Vec<TrendPoint>,
    /// Trends grouped by category, the input of the correlation heatmap
    pub category_trends: Vec<TrendPoint>,
    pub category_correlation: CorrelationMatrix,
    pub summary: ReportSummary,
}

impl AnalysisReport {
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            articles: Vec::new(),
            topics: Vec::new(),
            topic_trends: Vec::new(),
            category_trends: Vec::new(),
            category_correlation: CorrelationMatrix::default(),
            summary: ReportSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Article titles in display order
    pub fn headlines(&self) -> Vec<&str> {
        self.articles
            .iter()
            .map(|a| a.article.title.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Topic trend points flagged as spikes
    pub fn spikes(&self) -> impl Iterator<Item = &TrendPoint> {
        self.topic_trends.iter().filter(|p| p.spike_flag)
    }
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// Runs every analysis stage over a batch of fetched articles
pub struct NewsPipeline {
    classifier: Arc<dyn SentimentClassifier>,
    n_topics: Option<usize>,
    trend_options: TrendOptions,
    correlation_metric: CorrelationMetric,
}

impl NewsPipeline {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self {
            classifier,
            n_topics: None,
            trend_options: TrendOptions::default(),
            correlation_metric: CorrelationMetric::default(),
        }
    }

    /// Lexicon sentiment with topic and trend settings from `config`
    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            n_topics: config.n_topics,
            trend_options: TrendOptions::from_config(config),
            ..Self::new(Arc::new(LexiconClassifier::new()))
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn SentimentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_n_topics(mut self, n_topics: Option<usize>) -> Self {
        self.n_topics = n_topics;
        self
    }

    pub fn with_trend_options(mut self, options: TrendOptions) -> Self {
        self.trend_options = options;
        self
    }

    pub fn with_correlation_metric(mut self, metric: CorrelationMetric) -> Self {
        self.correlation_metric = metric;
        self
    }

    /// Annotate `articles` and aggregate them into a report
    pub async fn run(&self, articles: Vec<Article>) -> Result<AnalysisReport> {
        if articles.is_empty() {
            return Ok(AnalysisReport::empty());
        }
        info!(
            count = articles.len(),
            classifier = self.classifier.name(),
            "Running analysis pipeline"
        );

        let prepared: Vec<_> = {
            let _span = info_span!("preprocess").entered();
            articles.iter().map(preprocess).collect()
        };

        let texts: Vec<String> = articles.iter().map(Article::analysis_text).collect();
        let sentiments = self
            .classifier
            .classify_batch(&texts)
            .instrument(info_span!("sentiment"))
            .await?;

        let entities: Vec<_> = {
            let _span = info_span!("entities").entered();
            texts.iter().map(|t| extract_entities(t)).collect()
        };

        let topic_model = {
            let _span = info_span!("topics").entered();
            let lemmas: Vec<Vec<String>> = prepared.iter().map(|p| p.lemmas.clone()).collect();
            generate_topics(&lemmas, self.n_topics)
        };
        debug!(topics = topic_model.topics.len(), "Topics assigned");

        let annotated: Vec<AnnotatedArticle> = articles
            .into_iter()
            .zip(prepared)
            .zip(sentiments)
            .zip(entities)
            .enumerate()
            .map(|(i, (((article, prep), sentiment), entities))| {
                let topic = topic_model.assignments[i];
                AnnotatedArticle {
                    article,
                    cleaned_text: prep.cleaned_text,
                    tokens: prep.tokens,
                    lemmas: prep.lemmas,
                    sentiment: sentiment.label,
                    stars: sentiment.stars,
                    sentiment_score: sentiment.confidence,
                    entities,
                    topic,
                    topic_label: topic_model.label(topic),
                    topic_probability: topic_model.probabilities[i],
                }
            })
            .collect();

        let _span = info_span!("aggregate").entered();
        let topic_rows: Vec<TrendInput> = annotated
            .iter()
            .map(|a| TrendInput::from_article(a, TrendDimension::Topic))
            .collect();
        let category_rows: Vec<TrendInput> = annotated
            .iter()
            .map(|a| TrendInput::from_article(a, TrendDimension::Category))
            .collect();
        let topic_trends = detect_trends(&topic_rows, &self.trend_options)?;
        let category_trends = detect_trends(&category_rows, &self.trend_options)?;
        let category_correlation =
            compute_category_correlation(&category_trends, self.correlation_metric);

        let report = AnalysisReport {
            generated_at: Utc::now(),
            summary: ReportSummary::from_articles(&annotated),
            articles: annotated,
            topics: topic_model.topics,
            topic_trends,
            category_trends,
            category_correlation,
        };
        info!(
            articles = report.articles.len(),
            topics = report.topics.len(),
            spikes = report.spikes().count(),
            "Analysis complete"
        );
        Ok(report)
    }
}
