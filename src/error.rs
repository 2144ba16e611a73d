//! Error types for spike-emitter
//!
//! All errors implement `IntoResponse` for Axum handlers.

use crate::interval::IntervalParseError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to set up metrics sink: {0}")]
    SinkSetup(String),

    #[error("Sorry, only POST methods are supported.")]
    MethodNotAllowed,

    #[error("Failed to read body: {0}")]
    BodyRead(String),

    #[error("Failed to decode body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to parse {kind}: {source}")]
    Parse {
        kind: &'static str,
        #[source]
        source: IntervalParseError,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
