//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for a single page visit
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CrawlError {
    /// HTTP status of the failed visit, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            CrawlError::Status { status, .. } => Some(*status),
            CrawlError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::UrlParse(e) => CrateError::Other(format!("URL parse error: {}", e)),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}

/// Error type for a whole crawl run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `update` was called while another run was in progress
    #[error("A crawl run is already in progress")]
    AlreadyRunning,

    /// A crawler could not be built
    #[error("Crawler setup failed: {0}")]
    Setup(#[from] CrawlError),

    /// The extractors could not be built
    #[error("Extractor setup failed: {0}")]
    Extract(#[from] crate::extract::ExtractError),

    /// A listing URL could not be constructed
    #[error("Invalid listing URL: {0}")]
    ListingUrl(#[from] url::ParseError),

    /// The sink rejected a record; the run stopped writing after this
    #[error("Sink failed to store {link}: {source}")]
    Sink {
        link: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        CrateError::Crawl(err.to_string())
    }
}
