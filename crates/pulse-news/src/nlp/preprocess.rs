//! Text cleaning, tokenization and light lemmatization

use super::stopwords::stopwords;
use crate::model::Article;
use regex::Regex;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+").expect("valid URL regex"));
// Letters, combining marks and digits survive so Devanagari and other
// scripts keep their vowel signs.
static PUNCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}\s]").expect("valid punctuation regex"));
static SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Output of the preprocessing stage for one article
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preprocessed {
    pub cleaned_text: String,
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
}

/// Lowercase, strip URLs and punctuation, collapse whitespace
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_REGEX.replace_all(&lower, "");
    let no_punct = PUNCT_REGEX.replace_all(&no_urls, "");
    SPACE_REGEX.replace_all(&no_punct, " ").trim().to_string()
}

/// Language whose rules apply to `text`
///
/// Languages without a stopword list fall back to English rules when the
/// text is plain ASCII, and to bare whitespace tokens otherwise.
fn rules_language<'a>(language: &'a str, text: &str) -> &'a str {
    if stopwords(language).is_some() {
        language
    } else if text.is_ascii() {
        "en"
    } else {
        language
    }
}

/// Split cleaned text into tokens and lemmas
///
/// Returns `(tokens, lemmas)` of equal length.
pub fn tokenize_and_lemmatize(text: &str, language: &str) -> (Vec<String>, Vec<String>) {
    let language = rules_language(language, text);
    let words = text.split_whitespace();

    let tokens: Vec<String> = match stopwords(language) {
        Some(stop) => words
            .filter(|w| !stop.contains(w))
            .map(str::to_string)
            .collect(),
        None => words.map(str::to_string).collect(),
    };

    let lemmas = if language == "en" {
        tokens.iter().map(|t| lemmatize(t)).collect()
    } else {
        tokens.clone()
    };

    (tokens, lemmas)
}

/// Clean and tokenize an article's title and description
pub fn preprocess(article: &Article) -> Preprocessed {
    let cleaned_text = clean_text(&article.analysis_text());
    let (tokens, lemmas) = tokenize_and_lemmatize(&cleaned_text, &article.language);
    Preprocessed {
        cleaned_text,
        tokens,
        lemmas,
    }
}

/// Words that look plural but are not
const INVARIANT: &[&str] = &["news", "series", "species", "means", "always", "perhaps"];

/// Suffix-stripping lemmatizer for English
pub fn lemmatize(word: &str) -> String {
    if word.len() <= 3
        || !word.bytes().all(|b| b.is_ascii_lowercase())
        || INVARIANT.contains(&word)
        || word.ends_with("ics")
    {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies").filter(|s| s.len() >= 2) {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("ied").filter(|s| s.len() >= 2) {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ["s", "x", "z", "ch", "sh"].iter().any(|end| stem.ends_with(end)) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix("ing").filter(|s| is_verb_stem(s)) {
        return undouble(stem);
    }
    if let Some(stem) = word.strip_suffix("ed").filter(|s| is_verb_stem(s)) {
        return undouble(stem);
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    word.to_string()
}

fn is_verb_stem(stem: &str) -> bool {
    stem.len() >= 3 && stem.bytes().any(|b| b"aeiouy".contains(&b))
}

fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 4 && bytes[n - 1] == bytes[n - 2] && !b"aeiouls".contains(&bytes[n - 1]) {
        stem[..n - 1].to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsProvider;

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("Breaking: Sensex UP 2%!  Read https://x.com/a or www.site.in now"),
            "breaking sensex up 2 read or now"
        );
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_clean_text_keeps_devanagari() {
        assert_eq!(clean_text("भारत की अर्थव्यवस्था, तेज़!"), "भारत की अर्थव्यवस्था तेज़");
    }

    #[test]
    fn test_english_tokens_and_lemmas() {
        let (tokens, lemmas) = tokenize_and_lemmatize("the companies are raising taxes", "en");
        assert_eq!(tokens, vec!["companies", "raising", "taxes"]);
        assert_eq!(lemmas, vec!["company", "rais", "tax"]);
    }

    #[test]
    fn test_lemmatize_rules() {
        assert_eq!(lemmatize("markets"), "market");
        assert_eq!(lemmatize("rallied"), "rally");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("crisis"), "crisis");
        assert_eq!(lemmatize("bonus"), "bonus");
        assert_eq!(lemmatize("banned"), "ban");
        assert_eq!(lemmatize("needed"), "need");
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("red"), "red");
        assert_eq!(lemmatize("2024"), "2024");
        assert_eq!(lemmatize("news"), "news");
        assert_eq!(lemmatize("politics"), "politics");
    }

    #[test]
    fn test_hindi_drops_stopwords_without_lemmas() {
        let (tokens, lemmas) = tokenize_and_lemmatize("भारत की अर्थव्यवस्था", "hi");
        assert_eq!(tokens, vec!["भारत", "अर्थव्यवस्था"]);
        assert_eq!(tokens, lemmas);
    }

    #[test]
    fn test_unlisted_language_fallback() {
        let (tokens, _) = tokenize_and_lemmatize("le marché est ouvert", "fr");
        assert_eq!(tokens.len(), 4);

        let (tokens, lemmas) = tokenize_and_lemmatize("the markets", "de");
        assert_eq!(tokens, vec!["markets"]);
        assert_eq!(lemmas, vec!["market"]);
    }

    #[test]
    fn test_preprocess_article() {
        let mut article = Article::new("Stocks Rally", NewsProvider::NewsApi);
        article.content = Some("Investors cheered the news.".to_string());
        let out = preprocess(&article);
        assert_eq!(out.cleaned_text, "stocks rally investors cheered the news");
        assert_eq!(out.tokens, vec!["stocks", "rally", "investors", "cheered", "news"]);
        assert_eq!(out.lemmas, vec!["stock", "rally", "investor", "cheer", "news"]);
    }
}
