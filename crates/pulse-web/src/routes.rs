//! Request handlers

use crate::AppState;
use crate::error::{Result, WebError};
use crate::i18n::{DEFAULT_INTERFACE_LANGUAGE, interface_language};
use crate::render::{DashboardView, LOGIN_ERROR, LoginView, NO_NEWS_NOTICE};
use crate::session::{SharedSession, UserSession, cleared_cookie, session_cookie, session_id};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use pulse_news::catalog::selectable_news_languages;
use pulse_news::{AnalysisReport, ExtendedCategory};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<SharedSession> {
    state.sessions.get(session_id(headers)?).await
}

fn home() -> Response {
    Redirect::to("/").into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    lang: Option<String>,
}

/// Dashboard for a logged-in user, login page otherwise
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Html<String>> {
    if let Some(session) = current_session(&state, &headers).await {
        let mut session = session.lock().await;
        let html = state
            .renderer
            .dashboard(&DashboardView::from_session(&session)?)?;
        session.notice = None;
        return Ok(Html(html));
    }

    let language = interface_language(query.lang.as_deref().unwrap_or(DEFAULT_INTERFACE_LANGUAGE));
    Ok(Html(state.renderer.login(&LoginView::new(language))?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    username: String,
    email: String,
    password: String,
    language: String,
}

/// Any non-empty username and password opens a session
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response> {
    let language = interface_language(&form.language);
    let username = form.username.trim();

    if username.is_empty() || form.password.is_empty() {
        let view = LoginView {
            username,
            email: &form.email,
            error: Some(LOGIN_ERROR),
            ..LoginView::new(language)
        };
        return Ok(Html(state.renderer.login(&view)?).into_response());
    }

    let session = UserSession::new(username, form.email.trim(), language, state.new_chatbot());
    let id = state.sessions.create(session).await;
    info!(username, language, "User logged in");

    let cookie = session_cookie(id, state.sessions.ttl_secs());
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.remove(id).await;
    }
    ([(SET_COOKIE, cleared_cookie())], Redirect::to("/")).into_response()
}

#[derive(Debug, Deserialize)]
pub struct FetchForm {
    language: String,
    category: String,
    /// Present when the user asked to bypass the recent-fetch memo
    #[serde(default)]
    refresh: Option<String>,
}

/// Fetch, analyse and store a report in the session
pub async fn fetch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FetchForm>,
) -> Result<Response> {
    let Some(session) = current_session(&state, &headers).await else {
        return Ok(home());
    };

    let category: ExtendedCategory = form.category.parse().map_err(WebError::BadRequest)?;
    let language = form.language.trim().to_lowercase();
    if !selectable_news_languages().contains(&language.as_str()) {
        return Err(WebError::BadRequest(format!(
            "Unsupported news language: {language}"
        )));
    }

    info!(%category, language = %language, "Fetching news");
    let articles = state
        .aggregator
        .get_all_news_with(category, &language, form.refresh.is_some())
        .await?;
    let report = state.pipeline.run(articles).await?;

    let mut session = session.lock().await;
    session.news_language = language;
    session.category = category;
    if report.is_empty() {
        session.notice = Some(NO_NEWS_NOTICE.to_string());
        session.report = None;
    } else {
        session.notice = None;
        session.chatbot.set_context(&report);
        session.report = Some(Arc::new(report));
    }
    Ok(home())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatForm {
    prompt: String,
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let Some(session) = current_session(&state, &headers).await else {
        return home();
    };
    // The model call runs without the session lock held
    let pending = session.lock().await.chatbot.prepare(&form.prompt);
    let reply = pending.resolve().await;
    session.lock().await.chatbot.record(&form.prompt, reply);
    home()
}

pub async fn clear_chat(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session) = current_session(&state, &headers).await {
        session.lock().await.chatbot.clear();
    }
    home()
}

/// The session's last report as JSON, empty before the first fetch
pub async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalysisReport>> {
    let session = current_session(&state, &headers)
        .await
        .ok_or(WebError::Unauthorized)?;
    let report = session
        .lock()
        .await
        .report
        .as_deref()
        .cloned()
        .unwrap_or_else(AnalysisReport::empty);
    Ok(Json(report))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
