//! Sentiment classification on a 1-5 star scale

use super::preprocess::lemmatize;
use crate::error::Result;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use pulse_llm::{CompletionRequest, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Text classified when an article has nothing to read
pub const EMPTY_PLACEHOLDER: &str = "No content";

/// Coarse sentiment of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Stars ≤ 2 are negative, 3 neutral, ≥ 4 positive
    pub fn from_stars(stars: u8) -> Self {
        match stars {
            0..=2 => Self::Negative,
            3 => Self::Neutral,
            _ => Self::Positive,
        }
    }

    /// Numeric value used for averaging: +1, 0 or -1
    pub fn score(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Neutral => 0.0,
            Self::Negative => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a label string to +1 / 0 / -1
///
/// Accepts both `Positive` and `POSITIVE` spellings; anything else is 0.
pub fn sentiment_to_score(label: &str) -> f64 {
    match label {
        "POSITIVE" | "Positive" => 1.0,
        "NEGATIVE" | "Negative" => -1.0,
        _ => 0.0,
    }
}

/// One classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// 1-5
    pub stars: u8,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl SentimentResult {
    pub fn from_stars(stars: u8, confidence: f64) -> Self {
        let stars = stars.clamp(1, 5);
        Self {
            label: SentimentLabel::from_stars(stars),
            stars,
            confidence,
        }
    }
}

/// Something that can rate text on a 1-5 star scale
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentResult>;

    /// Classify many texts, preserving order
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify(text).await?);
        }
        Ok(results)
    }

    fn name(&self) -> &str;
}

const POSITIVE_WORDS: &[&str] = &[
    "win", "success", "gain", "rise", "surge", "soar", "jump", "rally", "approve", "agree",
    "pass", "breakthrough", "progress", "strong", "boost", "improve", "record", "optimistic",
    "confident", "support", "growth", "grow", "profit", "benefit", "best", "good", "great",
    "celebrate", "recover", "recovery", "hope", "peace", "award", "launch", "innovative",
    "thrive", "upgrade", "positive", "safe", "relief", "welcome", "achieve", "victory",
    "expand", "cheer", "happy", "love", "top", "lead", "milestone",
];

const NEGATIVE_WORDS: &[&str] = &[
    "lose", "loss", "fail", "failure", "drop", "fall", "crash", "reject", "oppose", "block",
    "crisis", "collapse", "weak", "decline", "worst", "threat", "risk", "pessimistic",
    "concern", "fear", "scandal", "kill", "dead", "death", "attack", "war", "flood", "fire",
    "injure", "arrest", "fraud", "protest", "slump", "plunge", "tumble", "cut", "layoff",
    "violence", "accident", "disaster", "bad", "poor", "negative", "warn", "warning", "delay",
    "ban", "shortage", "inflation", "recession", "terror", "murder", "crime", "victim",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "without", "nor", "dont", "doesnt", "didnt", "isnt", "wasnt",
    "cannot", "cant", "wont", "hardly",
];

/// Negation reaches this many words ahead
const NEGATION_SCOPE: usize = 3;

static POSITIVE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| POSITIVE_WORDS.iter().copied().collect());
static NEGATIVE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| NEGATIVE_WORDS.iter().copied().collect());

/// Word-list classifier
///
/// Counts positive and negative words (a negator flips the next
/// sentiment word within a short scope), maps the polarity
/// `(pos - neg) / (pos + neg)` onto stars and reports the dominant share
/// as confidence.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify without going through the async trait
    pub fn score(&self, text: &str) -> SentimentResult {
        let text = if text.trim().is_empty() {
            EMPTY_PLACEHOLDER
        } else {
            text
        };

        let mut pos = 0usize;
        let mut neg = 0usize;
        let mut negation_left = 0usize;

        for raw in text.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if word.is_empty() {
                continue;
            }

            if NEGATORS.contains(&word.as_str()) {
                negation_left = NEGATION_SCOPE;
                continue;
            }

            let polarity = word_polarity(&word);
            if polarity != 0 {
                let flipped = if negation_left > 0 { -polarity } else { polarity };
                if flipped > 0 {
                    pos += 1;
                } else {
                    neg += 1;
                }
                negation_left = 0;
            } else {
                negation_left = negation_left.saturating_sub(1);
            }
        }

        let hits = pos + neg;
        if hits == 0 {
            return SentimentResult::from_stars(3, 0.5);
        }

        let polarity = (pos as f64 - neg as f64) / hits as f64;
        let stars = match polarity {
            p if p <= -0.6 => 1,
            p if p < -0.2 => 2,
            p if p <= 0.2 => 3,
            p if p < 0.6 => 4,
            _ => 5,
        };
        let confidence = pos.max(neg) as f64 / hits as f64;
        SentimentResult::from_stars(stars, confidence)
    }
}

fn word_polarity(word: &str) -> i8 {
    let lemma = lemmatize(word);
    let candidates = [
        word,
        lemma.as_str(),
        word.trim_end_matches('e'),
        word.trim_end_matches('s'),
    ];
    if candidates.iter().any(|w| POSITIVE_SET.contains(w)) {
        1
    } else if candidates.iter().any(|w| NEGATIVE_SET.contains(w)) {
        -1
    } else {
        0
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        Ok(self.score(text))
    }

    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        Ok(texts.iter().map(|t| self.score(t)).collect())
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

const STAR_PROMPT: &str = "You rate the sentiment of news text. \
Reply with a single digit from 1 (very negative) to 5 (very positive) and nothing else.";

/// Asks a language model for a star rating
pub struct LlmStarClassifier {
    provider: Arc<dyn LLMProvider>,
    model: String,
    concurrency: usize,
}

impl LlmStarClassifier {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            concurrency: 4,
        }
    }

    /// Requests in flight during a batch
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// First digit 1-5 in the reply
fn parse_stars(reply: &str) -> Option<u8> {
    reply
        .chars()
        .find_map(|c| c.to_digit(10))
        .filter(|d| (1..=5).contains(d))
        .map(|d| d as u8)
}

#[async_trait]
impl SentimentClassifier for LlmStarClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let text = if text.trim().is_empty() {
            EMPTY_PLACEHOLDER
        } else {
            text
        };

        let request = CompletionRequest::builder(&self.model)
            .system(STAR_PROMPT)
            .add_message(Message::user(text))
            .max_tokens(8)
            .temperature(0.0)
            .build();

        let response = self.provider.complete(request).await?;
        let reply = response.text().unwrap_or_default();

        match parse_stars(reply) {
            Some(stars) => {
                debug!(stars, "LLM star rating");
                Ok(SentimentResult::from_stars(stars, 1.0))
            }
            None => {
                warn!("Unparsable star rating: {reply:?}");
                Ok(SentimentResult::from_stars(3, 0.0))
            }
        }
    }

    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        stream::iter(texts.iter().cloned())
            .map(|text| async move { self.classify(&text).await })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    fn name(&self) -> &str {
        "llm-stars"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use pulse_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};

    mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> pulse_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(SentimentLabel::from_stars(1), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_stars(2), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_stars(3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_stars(5), SentimentLabel::Positive);
        assert!((SentimentLabel::Negative.score() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sentiment_to_score() {
        assert!((sentiment_to_score("POSITIVE") - 1.0).abs() < f64::EPSILON);
        assert!((sentiment_to_score("Negative") + 1.0).abs() < f64::EPSILON);
        assert!(sentiment_to_score("NEUTRAL").abs() < f64::EPSILON);
        assert!(sentiment_to_score("mixed").abs() < f64::EPSILON);
    }

    #[test]
    fn test_lexicon_positive_and_negative() {
        let classifier = LexiconClassifier::new();

        let up = classifier.score("Markets surge to record gains as growth improves");
        assert_eq!(up.label, SentimentLabel::Positive);
        assert_eq!(up.stars, 5);
        assert!((up.confidence - 1.0).abs() < f64::EPSILON);

        let down = classifier.score("Floods kill dozens as crisis deepens");
        assert_eq!(down.label, SentimentLabel::Negative);
        assert_eq!(down.stars, 1);
    }

    #[test]
    fn test_lexicon_negation() {
        let result = LexiconClassifier::new().score("Talks did not bring any progress");
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_lexicon_neutral_and_empty() {
        let classifier = LexiconClassifier::new();
        let neutral = classifier.score("The committee met to discuss the schedule");
        assert_eq!(neutral.stars, 3);
        assert!((neutral.confidence - 0.5).abs() < f64::EPSILON);

        assert_eq!(classifier.score("   ").label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_lexicon_mixed() {
        let result = LexiconClassifier::new().score("Profit up but layoffs loom");
        assert_eq!(result.stars, 3);
        assert!((result.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_stars() {
        assert_eq!(parse_stars("4"), Some(4));
        assert_eq!(parse_stars("Rating: 2 stars"), Some(2));
        assert_eq!(parse_stars("9"), None);
        assert_eq!(parse_stars("positive"), None);
    }

    #[tokio::test]
    async fn test_llm_classifier_batch() {
        let mut provider = MockProvider::new();
        provider.expect_complete().times(2).returning(|request| {
            let text = request.messages[0].content.clone();
            if text.contains("good") {
                Ok(reply("5"))
            } else {
                Ok(reply("not sure"))
            }
        });

        let classifier = LlmStarClassifier::new(Arc::new(provider), "gemini-flash-latest");
        let results = classifier
            .classify_batch(&["good news".to_string(), "something".to_string()])
            .await
            .unwrap();

        assert_eq!(results[0].stars, 5);
        assert_eq!(results[0].label, SentimentLabel::Positive);
        assert_eq!(results[1].stars, 3);
        assert!(results[1].confidence.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_llm_classifier_batch_keeps_order() {
        let mut provider = MockProvider::new();
        provider.expect_complete().times(5).returning(|request| {
            let text = request.messages[0].content.clone();
            Ok(reply(text.trim_start_matches("headline ")))
        });

        let texts: Vec<String> = (1..=5).map(|i| format!("headline {i}")).collect();
        let results = LlmStarClassifier::new(Arc::new(provider), "m")
            .with_concurrency(2)
            .classify_batch(&texts)
            .await
            .unwrap();

        let stars: Vec<u8> = results.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_llm_classifier_propagates_errors() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .returning(|_| Err(LLMError::RateLimitExceeded("quota".to_string())));

        let classifier = LlmStarClassifier::new(Arc::new(provider), "m");
        assert!(classifier.classify("text").await.is_err());
    }
}
