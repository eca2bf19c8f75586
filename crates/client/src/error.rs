//! Client errors.

use thiserror::Error;

/// Errors raised while issuing an authenticated request.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request itself failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URI could not be resolved against the base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No session token could be obtained.
    #[error("session token unavailable: {0}")]
    SessionToken(String),

    /// Serializing a JSON body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
