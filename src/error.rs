// Error types for the strata caching layer.
// Covers network fetch errors, precache failures, and cache storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrataError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("precache of {path} failed: {reason}")]
    Precache { path: String, reason: String },

    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StrataError>;
