//! Web dashboard for NewsPulse
//!
//! An axum application serving:
//!
//! - A login page with translated labels
//! - A dashboard that fetches and analyses news for a language and category
//! - Plotly charts, a word cloud and a chat panel
//! - The last report as JSON under `/api/report`
//!
//! Sessions live in memory and expire after a period of inactivity.

pub mod charts;
pub mod error;
pub mod i18n;
pub mod render;
pub mod routes;
pub mod session;

pub use error::{Result, WebError};
pub use session::{SessionStore, UserSession};

use axum::Router;
use axum::routing::{get, post};
use pulse_llm::LLMProvider;
use pulse_news::chat::gemini_provider;
use pulse_news::{NewsAggregator, NewsChatbot, NewsConfig, NewsPipeline};
use render::Renderer;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NewsConfig>,
    pub aggregator: Arc<NewsAggregator>,
    pub pipeline: Arc<NewsPipeline>,
    pub chat_provider: Option<Arc<dyn LLMProvider>>,
    pub sessions: SessionStore,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn from_config(config: NewsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            aggregator: Arc::new(NewsAggregator::new(&config)?),
            pipeline: Arc::new(NewsPipeline::from_config(&config)),
            chat_provider: gemini_provider(&config)?,
            sessions: SessionStore::default(),
            renderer: Arc::new(Renderer::new()?),
            config: Arc::new(config),
        })
    }

    pub fn with_chat_provider(mut self, provider: Option<Arc<dyn LLMProvider>>) -> Self {
        self.chat_provider = provider;
        self
    }

    pub fn with_pipeline(mut self, pipeline: NewsPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// A chatbot for a new session, sharing the model client
    pub fn new_chatbot(&self) -> NewsChatbot {
        NewsChatbot::new(self.chat_provider.clone(), &self.config.chat_model)
    }
}

/// Build the dashboard router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/fetch", post(routes::fetch))
        .route("/chat", post(routes::chat))
        .route("/chat/clear", post(routes::clear_chat))
        .route("/api/report", get(routes::report))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let sessions = state.sessions.clone();
    let sweeper = tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let dropped = sessions.cleanup_expired().await;
            if dropped > 0 {
                debug!(dropped, "Expired sessions removed");
            }
        }
    });

    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down dashboard");
    }
}
