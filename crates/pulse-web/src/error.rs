//! Error types for the dashboard

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, WebError>;

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum WebError {
    /// Fetching or analysing news failed
    #[error(transparent)]
    News(#[from] pulse_news::NewsError),

    /// A page template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Chart data could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request carried an unusable value
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No live session for the request
    #[error("Not logged in")]
    Unauthorized,

    /// Binding or serving the listener failed
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::News(pulse_news::NewsError::RateLimitExceeded { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::News(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) | Self::Json(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(WebError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        let limited: WebError = pulse_news::NewsError::RateLimitExceeded {
            provider: "newsapi".to_string(),
        }
        .into();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.to_string(), "Rate limit exceeded for newsapi");
    }
}
