//! Error types shared by the handlers, the stores and the model client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level error surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or missing client input.
    #[error("{0}")]
    Validation(String),

    /// A storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything unexpected; reported as a 500 with a generic message.
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl AppError {
    pub fn internal(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        AppError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<LexiconError> for AppError {
    fn from(err: LexiconError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(message) => ErrorResponse { error: message, detail: None },
            AppError::Internal { message, detail } => ErrorResponse {
                error: message,
                detail: Some(detail),
            },
            other => ErrorResponse {
                error: other.to_string(),
                detail: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Failures talking to the hosted generative model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,
}

/// Problems loading the keyword lexicon or the support catalog.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern for {category}: {source}")]
    Pattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown indicator category: {0}")]
    UnknownCategory(String),

    #[error("missing pattern for indicator category: {0}")]
    MissingCategory(String),

    #[error("tier {tier} references unknown activity category: {category}")]
    UnknownActivityCategory { tier: String, category: String },

    #[error("missing tier: {0}")]
    MissingTier(String),
}
