use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for aggregator operations
pub type Result<T> = std::result::Result<T, AggregatorError>;

/// Aggregator error types
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("{label} timeout after {deadline_ms}ms")]
    Timeout { label: String, deadline_ms: u64 },

    #[error("{label} request failed: {cause}")]
    Upstream { label: String, cause: String },

    #[error("no results from {stage}")]
    EmptyResult { stage: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AggregatorError {
    /// Build a timeout error for the given call label and deadline
    pub fn timeout(label: impl Into<String>, deadline_ms: u64) -> Self {
        AggregatorError::Timeout {
            label: label.into(),
            deadline_ms,
        }
    }

    /// Build an upstream failure for the given call label
    pub fn upstream(label: impl Into<String>, cause: impl Into<String>) -> Self {
        AggregatorError::Upstream {
            label: label.into(),
            cause: cause.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AggregatorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AggregatorError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AggregatorError::EmptyResult { .. } => StatusCode::NOT_FOUND,
            AggregatorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AggregatorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AggregatorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
