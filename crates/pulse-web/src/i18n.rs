//! Interface languages and translated UI labels
//!
//! Labels exist for English and Hindi. Every other interface language can be
//! selected but renders with English labels.

use serde::Serialize;

/// Languages offered for the interface
pub const INTERFACE_LANGUAGES: [&str; 19] = [
    "English",
    "Hindi",
    "Arabic",
    "Bengali",
    "Chinese",
    "French",
    "German",
    "Gujarati",
    "Italian",
    "Kannada",
    "Malayalam",
    "Marathi",
    "Oriya",
    "Punjabi",
    "Russian",
    "Spanish",
    "Tamil",
    "Telugu",
    "Urdu",
];

pub const DEFAULT_INTERFACE_LANGUAGE: &str = "English";

/// Translated labels for one interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiText {
    pub login: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub select_category: &'static str,
    pub language: &'static str,
    pub fetch_news: &'static str,
    pub logout: &'static str,
}

const ENGLISH: UiText = UiText {
    login: "Login",
    username: "Username",
    password: "Password",
    select_category: "Select Category",
    language: "Language",
    fetch_news: "Fetch News",
    logout: "Logout",
};

const HINDI: UiText = UiText {
    login: "लॉगिन",
    username: "यूज़रनेम",
    password: "पासवर्ड",
    select_category: "श्रेणी चुनें",
    language: "भाषा",
    fetch_news: "समाचार लाएं",
    logout: "लॉगआउट",
};

/// Canonical name of an interface language
///
/// Matches names case-insensitively; unknown input falls back to English.
pub fn interface_language(name: &str) -> &'static str {
    let name = name.trim();
    INTERFACE_LANGUAGES
        .iter()
        .copied()
        .find(|l| l.eq_ignore_ascii_case(name))
        .unwrap_or(DEFAULT_INTERFACE_LANGUAGE)
}

/// Labels for an interface language, English when none are translated
pub fn ui_text(language: &str) -> &'static UiText {
    match interface_language(language) {
        "Hindi" => &HINDI,
        _ => &ENGLISH,
    }
}
