//! Error types for the cake-crawler crate

use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for crate operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Markup extraction error
    #[error("Extract error: {0}")]
    Extract(String),

    /// Gazetteer loading error
    #[error("Gazetteer error: {0}")]
    Gazetteer(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
