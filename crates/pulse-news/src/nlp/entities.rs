//! Named-entity extraction from capitalisation patterns
//!
//! Entities are maximal runs of capitalised words in the raw text, optionally
//! joined by connectors such as "of" ("Bank of America"). Labels come from
//! person titles, organisation keywords and a small location gazetteer.
//! Scripts without letter case (Devanagari, Tamil, ...) yield no entities.

use super::stopwords::is_english_stopword;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "LOC")]
    Loc,
    #[serde(rename = "MISC")]
    Misc,
}

impl EntityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Per => "PER",
            Self::Org => "ORG",
            Self::Loc => "LOC",
            Self::Misc => "MISC",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entity found in an article
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

const TITLES: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sir", "President", "Minister", "Prime", "PM", "CEO",
    "Chief", "Chairman", "Judge", "Justice", "Sen", "Senator", "Gov", "Governor",
    "Chancellor", "King", "Queen", "Prince", "Princess", "Pope", "General", "Captain",
    "Shri", "Smt",
];

const ORG_WORDS: &[&str] = &[
    "Inc", "Corp", "Corporation", "Ltd", "Limited", "LLC", "Plc", "Co", "Company", "Bank",
    "Group", "Holdings", "Party", "Ministry", "Council", "Association", "University",
    "Institute", "Agency", "Commission", "Federation", "Board", "Committee", "Court",
    "Police", "Army", "Navy", "Motors", "Industries", "Technologies", "Airlines",
    "Airways", "Foundation", "Organisation", "Organization", "Union", "Department",
    "Exchange", "Fund", "Reserve", "Parliament", "Congress", "Senate", "Club", "Times",
];

const LOC_SUFFIXES: &[&str] = &[
    "City", "State", "River", "Province", "Island", "Islands", "Valley", "Mountains",
    "Ocean", "Sea", "Lake", "District", "County", "Street",
];

const LOCATIONS: &[&str] = &[
    "India", "China", "Pakistan", "United States", "US", "U.S.", "USA", "UK", "Britain",
    "United Kingdom", "Russia", "Ukraine", "Japan", "Germany", "France", "Italy", "Spain",
    "Canada", "Australia", "Brazil", "Mexico", "Israel", "Iran", "Iraq", "Gaza", "Syria",
    "Afghanistan", "Bangladesh", "Nepal", "Sri Lanka", "Egypt", "Saudi Arabia", "UAE",
    "Qatar", "Turkey", "South Africa", "Nigeria", "Kenya", "Indonesia", "Singapore",
    "Taiwan", "Korea", "South Korea", "North Korea", "Europe", "Asia", "Africa", "America",
    "Delhi", "New Delhi", "Mumbai", "Kolkata", "Chennai", "Bengaluru", "Bangalore",
    "Hyderabad", "Pune", "Ahmedabad", "Jaipur", "Lucknow", "London", "Paris", "Berlin",
    "Moscow", "Beijing", "Tokyo", "Washington", "New York", "California", "Texas", "Dubai",
    "Hong Kong", "Kerala", "Tamil Nadu", "Karnataka", "Maharashtra", "Gujarat", "Punjab",
    "Bihar", "Uttar Pradesh", "West Bengal", "Rajasthan", "Kashmir", "Assam", "Odisha",
    "Telangana", "Andhra Pradesh", "Goa",
];

/// Lowercase words that may sit inside a capitalised run
const CONNECTORS: &[&str] = &["of", "for", "&", "de", "la", "von", "van"];

static TITLE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| TITLES.iter().copied().collect());
static ORG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ORG_WORDS.iter().copied().collect());
static LOC_SUFFIX_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| LOC_SUFFIXES.iter().copied().collect());
static LOCATION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| LOCATIONS.iter().copied().collect());

#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    sentence_start: bool,
    /// Trailing punctuation or a possessive closes any run here
    breaks_after: bool,
}

impl Word<'_> {
    fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn is_connector(&self) -> bool {
        CONNECTORS.contains(&self.text)
    }
}

fn split_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut sentence_start = true;

    for raw in text.split_whitespace() {
        let leading = raw.trim_start_matches(|c: char| !c.is_alphanumeric() && c != '&');
        let mut core = leading.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '&');
        // Keep the final dot of dotted abbreviations such as "U.S."
        if core.contains('.') && leading[core.len()..].starts_with('.') {
            core = &leading[..=core.len()];
        }

        let mut possessive = false;
        for suffix in ["'s", "’s"] {
            if let Some(stem) = core.strip_suffix(suffix) {
                core = stem;
                possessive = true;
            }
        }

        let trailing = &leading[core.len()..];
        let ends_sentence = trailing.contains(['.', '!', '?']) && !core.contains('.');
        if !core.is_empty() {
            words.push(Word {
                text: core,
                sentence_start,
                breaks_after: possessive || !trailing.is_empty(),
            });
        }
        sentence_start = ends_sentence || (core.is_empty() && sentence_start);
    }

    words
}

fn is_acronym(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| *c != '.').collect();
    (2..=6).contains(&letters.len()) && letters.iter().all(char::is_ascii_uppercase)
}

fn label_run(parts: &[&str]) -> Option<Entity> {
    let untitled: Vec<&str> = parts
        .iter()
        .copied()
        .skip_while(|p| TITLE_SET.contains(p.trim_end_matches('.')))
        .collect();

    if untitled.is_empty() {
        return None;
    }
    if untitled.len() < parts.len() {
        return Some(Entity::new(untitled.join(" "), EntityLabel::Per));
    }

    let text = parts.join(" ");
    let last = parts[parts.len() - 1];
    let label = if LOCATION_SET.contains(text.as_str()) {
        EntityLabel::Loc
    } else if parts.iter().any(|p| ORG_SET.contains(p)) {
        EntityLabel::Org
    } else if parts.len() > 1 && LOC_SUFFIX_SET.contains(last) {
        EntityLabel::Loc
    } else if parts.len() == 1 && is_acronym(last) {
        EntityLabel::Org
    } else {
        EntityLabel::Misc
    };
    Some(Entity::new(text, label))
}

/// Extract `(text, label)` pairs in order of first appearance
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let words = split_words(text);
    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    let mut i = 0;

    while i < words.len() {
        if !words[i].is_capitalized() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i + 1;
        let mut open = !words[i].breaks_after;
        // A sentence-initial word only joins connectors once a second
        // capitalised word follows it directly
        let mut allow_connector = !words[i].sentence_start;
        while open && end < words.len() {
            let next = &words[end];
            if next.is_capitalized() && !next.sentence_start {
                open = !next.breaks_after;
                allow_connector = true;
                end += 1;
            } else if allow_connector
                && next.is_connector()
                && !next.breaks_after
                && words
                    .get(end + 1)
                    .is_some_and(|w| w.is_capitalized() && !w.sentence_start)
            {
                open = !words[end + 1].breaks_after;
                end += 2;
            } else {
                break;
            }
        }
        i = end;

        let mut parts: Vec<&str> = words[start..end].iter().map(|w| w.text).collect();
        while parts.len() > 1 && is_english_stopword(&parts[0].to_lowercase()) {
            parts.remove(0);
        }

        if words[start].sentence_start && parts.len() == 1 {
            let only = parts[0];
            let known = LOCATION_SET.contains(only) || is_acronym(only);
            if !known {
                continue;
            }
        }

        if let Some(entity) = label_run(&parts) {
            if seen.insert(entity.clone()) {
                entities.push(entity);
            }
        }
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, &'static str)> {
        extract_entities(text)
            .into_iter()
            .map(|e| (e.text, e.label.as_str()))
            .collect()
    }

    #[test]
    fn test_people_orgs_places() {
        let found = pairs("Prime Minister Narendra Modi met officials of Tata Motors in Mumbai on Monday.");
        assert_eq!(
            found,
            vec![
                ("Narendra Modi".to_string(), "PER"),
                ("Tata Motors".to_string(), "ORG"),
                ("Mumbai".to_string(), "LOC"),
                ("Monday".to_string(), "MISC"),
            ]
        );
    }

    #[test]
    fn test_connector_inside_run() {
        let found = pairs("Shares of Bank of America fell in New York trading.");
        assert_eq!(
            found,
            vec![
                ("Bank of America".to_string(), "ORG"),
                ("New York".to_string(), "LOC"),
            ]
        );
    }

    #[test]
    fn test_sentence_initial_words() {
        assert!(extract_entities("The market fell. It was bad.").is_empty());
        assert_eq!(pairs("The RBI kept rates steady."), vec![("RBI".to_string(), "ORG")]);
        assert_eq!(pairs("India's economy grew."), vec![("India".to_string(), "LOC")]);
    }

    #[test]
    fn test_duplicates_removed() {
        let found = pairs("Shares of Infosys rose while Infosys rivals fell.");
        assert_eq!(found, vec![("Infosys".to_string(), "MISC")]);
    }

    #[test]
    fn test_caseless_script() {
        assert!(extract_entities("भारत की अर्थव्यवस्था तेज़ी से बढ़ी").is_empty());
    }

    #[test]
    fn test_label_serde() {
        let json = serde_json::to_string(&Entity::new("Delhi", EntityLabel::Loc)).unwrap();
        assert_eq!(json, r#"{"text":"Delhi","label":"LOC"}"#);
    }
}
