//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use folio_repo::{RouteError, ScanError};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configured port is outside `1..=65535`.
    #[error("Invalid port {0}: must be between 1 and 65535")]
    InvalidPort(i64),

    /// `start` was called on a server that is not stopped.
    #[error("Server is already running")]
    AlreadyRunning,

    /// Request path could not be turned into a route.
    #[error("Invalid route: {0}")]
    InvalidRoute(#[from] RouteError),

    /// No item or file at the given path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content directory could not be scanned.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// File watcher could not be set up.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub(crate) fn bind(addr: String, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidRoute(RouteError::Invalid { path, reason }) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid route", "path": path, "reason": reason}),
            ),
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = ServerError::NotFound("/missing".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
        assert_eq!(json["path"], "/missing");
    }

    #[tokio::test]
    async fn test_invalid_route_is_bad_request() {
        let err = folio_repo::Route::from_request("/a/../b").unwrap_err();
        let response = ServerError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid route");
        assert_eq!(json["reason"], "parent reference in path");
    }

    #[test]
    fn test_invalid_port_message() {
        assert_eq!(
            ServerError::InvalidPort(70000).to_string(),
            "Invalid port 70000: must be between 1 and 65535"
        );
    }
}
