//! Stopword lists

use std::collections::HashSet;
use std::sync::LazyLock;

/// NLTK English stopwords
const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
    "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
    "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
    "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Common Hindi function words
const HINDI: &[&str] = &[
    "का", "के", "की", "को", "में", "है", "हैं", "था", "थे", "थी", "और", "से", "पर", "ने",
    "यह", "वह", "ये", "वे", "इस", "उस", "इन", "उन", "एक", "भी", "तो", "ही", "जो", "कि",
    "या", "लिए", "तक", "साथ", "बाद", "अपने", "अपनी", "अपना", "कर", "किया", "गया", "गई",
    "हो", "होने", "होता", "होती", "रहा", "रही", "रहे", "जा", "नहीं", "कुछ", "सकता", "सकते",
    "जब", "तब", "अब", "द्वारा", "कोई", "करने", "करते", "हुआ", "हुई", "हुए",
];

static ENGLISH_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH.iter().copied().collect());
static HINDI_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HINDI.iter().copied().collect());

/// Stopwords for a language code, if a list exists
pub fn stopwords(language: &str) -> Option<&'static HashSet<&'static str>> {
    match language {
        "en" => Some(&ENGLISH_SET),
        "hi" => Some(&HINDI_SET),
        _ => None,
    }
}

pub fn is_english_stopword(word: &str) -> bool {
    ENGLISH_SET.contains(word)
}
