//! Text processing stages: cleaning, sentiment, entities and topics

pub mod entities;
pub mod preprocess;
pub mod sentiment;
pub mod stopwords;
pub mod topics;

pub use entities::{Entity, EntityLabel, extract_entities};
pub use preprocess::{Preprocessed, clean_text, lemmatize, preprocess, tokenize_and_lemmatize};
pub use sentiment::{
    LexiconClassifier, LlmStarClassifier, SentimentClassifier, SentimentLabel, SentimentResult,
    sentiment_to_score,
};
pub use topics::{OUTLIER_TOPIC, TopicInfo, TopicModel, generate_topics};
