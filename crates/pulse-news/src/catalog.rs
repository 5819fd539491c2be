//! Languages and categories understood by the news sources

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Language used when none is selected
pub const DEFAULT_NEWS_LANGUAGE: &str = "en";

/// Languages supported by NewsAPI (global news)
pub const NEWSAPI_LANGUAGES: &[&str] = &[
    "en", "hi", "ar", "de", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "sv", "ud", "zh",
];

/// Languages supported by NewsData.io (India-focused news + English)
pub const NEWSDATA_LANGUAGES: &[&str] = &[
    "en", "hi", "bn", "gu", "kn", "ml", "mr", "or", "pa", "ta", "te", "ur",
];

/// Indian languages, routed to NewsData.io
pub const INDIAN_LANGUAGES: &[&str] = &[
    "hi", "mr", "ta", "te", "kn", "ml", "gu", "pa", "or", "bn", "ur",
];

/// Categories NewsAPI's top-headlines endpoint accepts
pub const NEWSAPI_CATEGORIES: &[&str] = &[
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// Categories NewsData.io accepts
pub const NEWSDATA_CATEGORIES: &[&str] = &[
    "business",
    "crime",
    "domestic",
    "education",
    "entertainment",
    "environment",
    "food",
    "health",
    "lifestyle",
    "other",
    "politics",
    "science",
    "sports",
    "technology",
    "top",
    "tourism",
    "world",
];

/// Sorted union of both sources' languages, for the language selector
pub fn selectable_news_languages() -> Vec<&'static str> {
    NEWSAPI_LANGUAGES
        .iter()
        .chain(NEWSDATA_LANGUAGES)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Which APIs serve a given language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRoute {
    /// English and Hindi: both sources
    Both,
    /// Other Indian languages
    NewsDataOnly,
    /// Everything else
    NewsApiOnly,
}

impl SourceRoute {
    /// Route a language code to its sources
    pub fn for_language(language: &str) -> Self {
        match language {
            "en" | "hi" => Self::Both,
            lang if INDIAN_LANGUAGES.contains(&lang) => Self::NewsDataOnly,
            _ => Self::NewsApiOnly,
        }
    }

    pub fn uses_newsapi(self) -> bool {
        matches!(self, Self::Both | Self::NewsApiOnly)
    }

    pub fn uses_newsdata(self) -> bool {
        matches!(self, Self::Both | Self::NewsDataOnly)
    }
}

/// Categories offered in the dashboard, each covering several API keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtendedCategory {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
    Environment,
    Travel,
    Crime,
}

impl ExtendedCategory {
    /// All categories in display order
    pub const ALL: [ExtendedCategory; 10] = [
        Self::Business,
        Self::Entertainment,
        Self::General,
        Self::Health,
        Self::Science,
        Self::Sports,
        Self::Technology,
        Self::Environment,
        Self::Travel,
        Self::Crime,
    ];

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Entertainment => "Entertainment",
            Self::General => "General",
            Self::Health => "Health",
            Self::Science => "Science",
            Self::Sports => "Sports",
            Self::Technology => "Technology",
            Self::Environment => "Environment",
            Self::Travel => "Travel",
            Self::Crime => "Crime",
        }
    }

    /// Keywords the category stands for
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Business => &["business", "economy", "finance", "markets"],
            Self::Entertainment => &["entertainment", "movies", "tv", "music"],
            Self::General => &[
                "general",
                "world",
                "politics",
                "education",
                "lifestyle",
                "culture",
            ],
            Self::Health => &["health", "medicine", "wellness"],
            Self::Science => &["science", "research", "technology startups"],
            Self::Sports => &["sports"],
            Self::Technology => &["technology", "innovation", "startups"],
            Self::Environment => &["environment", "climate", "energy", "infrastructure"],
            Self::Travel => &["travel", "tourism"],
            Self::Crime => &["crime", "law"],
        }
    }

    /// Category to request from NewsAPI
    pub fn newsapi_category(self) -> &'static str {
        self.first_supported(NEWSAPI_CATEGORIES).unwrap_or("general")
    }

    /// Category to request from NewsData.io
    pub fn newsdata_category(self) -> &'static str {
        self.first_supported(NEWSDATA_CATEGORIES).unwrap_or("top")
    }

    fn first_supported(self, supported: &[&str]) -> Option<&'static str> {
        self.keywords()
            .iter()
            .copied()
            .find(|k| supported.contains(k))
    }
}

impl fmt::Display for ExtendedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExtendedCategory {
    type Err = String;

    /// Accepts a label ("Business") or any of its keywords ("finance")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(&needle))
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|c| c.keywords().contains(&needle.as_str()))
            })
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
