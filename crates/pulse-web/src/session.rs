//! In-memory login sessions keyed by a random cookie

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, TimeDelta, Utc};
use pulse_news::catalog::DEFAULT_NEWS_LANGUAGE;
use pulse_news::{AnalysisReport, ExtendedCategory, NewsChatbot};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "newspulse_session";

/// Idle time after which a session is dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Everything the dashboard remembers about one logged-in user
pub struct UserSession {
    pub username: String,
    pub email: String,
    pub interface_language: &'static str,
    pub news_language: String,
    pub category: ExtendedCategory,
    /// Result of the last fetch
    pub report: Option<Arc<AnalysisReport>>,
    /// One-off message shown on the next page view
    pub notice: Option<String>,
    pub chatbot: NewsChatbot,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl UserSession {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        interface_language: &'static str,
        chatbot: NewsChatbot,
    ) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            email: email.into(),
            interface_language,
            news_language: DEFAULT_NEWS_LANGUAGE.to_string(),
            category: ExtendedCategory::Business,
            report: None,
            notice: None,
            chatbot,
            created_at: now,
            last_active: now,
        }
    }

    pub fn update_activity(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn is_expired(&self, ttl: TimeDelta) -> bool {
        Utc::now() - self.last_active > ttl
    }
}

pub type SharedSession = Arc<Mutex<UserSession>>;

/// Session table shared by every request handler
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    ttl: TimeDelta,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Idle lifetime in whole seconds, for the cookie `Max-Age`
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Store a session under a fresh id
    pub async fn create(&self, session: UserSession) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Look up a live session and mark it active
    ///
    /// An expired session is removed and reported as missing.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        {
            let mut guard = session.lock().await;
            if !guard.is_expired(self.ttl) {
                guard.update_activity();
                return Some(session.clone());
            }
        }
        self.remove(id).await;
        None
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every expired session, returning how many were dropped
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A session locked by a request is in use
        sessions.retain(|_, s| s.try_lock().map_or(true, |s| !s.is_expired(self.ttl)));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Session id carried by the request cookies
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(id: Uuid, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value removing the session cookie
pub fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn session() -> UserSession {
        UserSession::new("alice", "a@example.com", "English", NewsChatbot::new(None, "m"))
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::default();
        let id = store.create(session()).await;

        let found = store.get(id).await.unwrap();
        assert_eq!(found.lock().await.username, "alice");
        assert_eq!(found.lock().await.news_language, "en");

        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_dropped() {
        let store = SessionStore::new(Duration::from_secs(60));
        let mut stale = session();
        stale.last_active = Utc::now() - TimeDelta::minutes(5);
        let stale_id = store.create(stale).await;
        let live_id = store.create(session()).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(live_id).await.is_some());

        let mut stale = session();
        stale.last_active = Utc::now() - TimeDelta::minutes(5);
        let stale_id_2 = store.create(stale).await;
        assert!(store.get(stale_id_2).await.is_none());
        assert!(store.get(stale_id).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_cookie_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));

        let mut bad = HeaderMap::new();
        bad.insert(COOKIE, HeaderValue::from_static("newspulse_session=nope"));
        assert_eq!(session_id(&bad), None);
        assert_eq!(session_id(&HeaderMap::new()), None);

        assert!(session_cookie(id, 60).contains("Max-Age=60"));
        assert!(cleared_cookie().contains("Max-Age=0"));
    }
}
