//! Request-boundary errors
//!
//! Every failure becomes `500 {"error": "<message>"}`, including malformed
//! request bodies.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockfish_session::EngineError;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or not the expected shape
    #[error("Malformed request: {0}")]
    RequestMalformed(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The detached engine task panicked or was cancelled
    #[error("Engine task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::RequestMalformed(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!("Request failed: {message}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: message }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: "Engine unavailable: gone".to_string(),
        };
        let json = serde_json::to_string(&body).expect("Should serialize");
        assert_eq!(json, r#"{"error":"Engine unavailable: gone"}"#);
    }

    #[test]
    fn test_engine_errors_keep_their_message() {
        let err: ApiError = EngineError::AlreadyConfigured.into();
        assert_eq!(err.to_string(), "Engine session is already configured");
    }

    #[test]
    fn test_every_error_is_a_server_error() {
        let response = ApiError::RequestMalformed("missing body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
