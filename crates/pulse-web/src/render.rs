//! HTML pages rendered with MiniJinja

use crate::charts::{CloudWord, DashboardCharts, script_json};
use crate::error::Result;
use crate::i18n::{INTERFACE_LANGUAGES, UiText, ui_text};
use crate::session::UserSession;
use minijinja::Environment;
use pulse_news::catalog::selectable_news_languages;
use pulse_news::chat::ConversationTurn;
use pulse_news::{AnnotatedArticle, ExtendedCategory};
use serde::Serialize;

/// Shown when a fetch returns nothing
pub const NO_NEWS_NOTICE: &str = "No news found for the selected category/language.";
/// Shown when login is missing a field
pub const LOGIN_ERROR: &str = "Please enter both username and password.";

/// Context of the login page
#[derive(Debug, Serialize)]
pub struct LoginView<'a> {
    pub ui: &'static UiText,
    pub languages: &'static [&'static str],
    pub language: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub error: Option<&'a str>,
}

impl<'a> LoginView<'a> {
    pub fn new(language: &'a str) -> Self {
        Self {
            ui: ui_text(language),
            languages: &INTERFACE_LANGUAGES,
            language,
            username: "",
            email: "",
            error: None,
        }
    }
}

/// One article as listed on the dashboard
#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub title: String,
    pub content: String,
    pub source: String,
    pub url: Option<String>,
    pub sentiment: String,
    pub entities: String,
    pub topic: String,
}

impl From<&AnnotatedArticle> for ArticleView {
    fn from(a: &AnnotatedArticle) -> Self {
        let entities = a
            .entities
            .iter()
            .map(|e| format!("{} ({})", e.text, e.label))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            title: a.article.title.clone(),
            content: a.article.content.clone().unwrap_or_default(),
            source: a.article.source.clone().unwrap_or_default(),
            url: a.article.url.clone(),
            sentiment: a.sentiment.to_string(),
            entities,
            topic: a.topic_label.clone(),
        }
    }
}

/// Context of the dashboard page
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub ui: &'static UiText,
    pub username: &'a str,
    pub news_languages: Vec<&'static str>,
    pub news_language: &'a str,
    pub categories: Vec<&'static str>,
    pub category: &'static str,
    pub notice: Option<&'a str>,
    pub articles: Vec<ArticleView>,
    /// Plotly figures as JSON, in display order
    pub charts: Vec<String>,
    pub words: Vec<CloudWord>,
    pub chat: Vec<&'a ConversationTurn>,
}

impl<'a> DashboardView<'a> {
    pub fn from_session(session: &'a UserSession) -> Result<Self> {
        let (articles, charts, words) = match &session.report {
            Some(report) => {
                let figures = DashboardCharts::from_report(report);
                let charts = [
                    figures.sentiment,
                    figures.categories,
                    figures.timeline,
                    figures.correlation,
                ]
                .iter()
                .flatten()
                .map(script_json)
                .collect::<serde_json::Result<Vec<_>>>()?;
                let articles = report.articles.iter().map(ArticleView::from).collect();
                (articles, charts, figures.words)
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        Ok(Self {
            ui: ui_text(session.interface_language),
            username: &session.username,
            news_languages: selectable_news_languages(),
            news_language: &session.news_language,
            categories: ExtendedCategory::ALL.iter().map(|c| c.label()).collect(),
            category: session.category.label(),
            notice: session.notice.as_deref(),
            articles,
            charts,
            words,
            chat: session.chatbot.history().history().iter().collect(),
        })
    }
}

/// Compiled page templates
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        env.add_template("dashboard.html", include_str!("../templates/dashboard.html"))?;
        Ok(Self { env })
    }

    pub fn login(&self, view: &LoginView<'_>) -> Result<String> {
        Ok(self.env.get_template("login.html")?.render(view)?)
    }

    pub fn dashboard(&self, view: &DashboardView<'_>) -> Result<String> {
        Ok(self.env.get_template("dashboard.html")?.render(view)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_news::NewsChatbot;

    #[test]
    fn test_login_page_translated() {
        let renderer = Renderer::new().unwrap();

        let english = renderer.login(&LoginView::new("English")).unwrap();
        assert!(english.contains("<h1>Login</h1>"));
        assert!(english.contains("<option value=\"Urdu\">"));

        let hindi = renderer.login(&LoginView::new("Hindi")).unwrap();
        assert!(hindi.contains("लॉगिन"));

        let view = LoginView {
            error: Some(LOGIN_ERROR),
            ..LoginView::new("English")
        };
        assert!(renderer.login(&view).unwrap().contains(LOGIN_ERROR));
    }

    #[test]
    fn test_dashboard_escapes_user_text() {
        let renderer = Renderer::new().unwrap();
        let mut session = UserSession::new(
            "<b>eve</b>",
            "",
            "English",
            NewsChatbot::new(None, "m"),
        );
        session.notice = Some(NO_NEWS_NOTICE.to_string());

        let html = renderer
            .dashboard(&DashboardView::from_session(&session).unwrap())
            .unwrap();
        assert!(html.contains("Logged in as: &lt;b&gt;eve"));
        assert!(!html.contains("<b>eve"));
        assert!(html.contains("No news found for the selected category"));
        assert!(html.contains("<option value=\"Business\" selected>"));
        assert!(!html.contains("Latest News"));
    }
}
