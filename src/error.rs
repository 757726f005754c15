//! Error types for the manuals server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentRefError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Body returned for upstream failures; upstream error pages are never forwarded
pub const UPSTREAM_FAILURE_BODY: &str = "Failed to fetch PDF";

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid document path: {0}")]
    Document(#[from] DocumentRefError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Failures talking to the object store
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("upstream URL {0:?} is invalid")]
    InvalidUrl(String),

    #[error("upstream answered {0}")]
    Status(StatusCode),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Document(e) => (StatusCode::BAD_REQUEST, "bad_request", e.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            // Upstream failures answer in plain text so the frame's own error
            // handling shows something sensible.
            AppError::Upstream(e) => {
                let status = match e {
                    UpstreamError::Status(status) => {
                        tracing::warn!(%status, "Upstream refused document");
                        *status
                    }
                    UpstreamError::Unreachable(err) => {
                        tracing::error!(error = %err, "Upstream unreachable");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    UpstreamError::InvalidUrl(url) => {
                        tracing::error!(%url, "Upstream URL is invalid");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                return (status, UPSTREAM_FAILURE_BODY).into_response();
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
