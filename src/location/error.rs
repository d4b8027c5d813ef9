//! Error types for the location module

use crate::error::Error as CrateError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for gazetteer loading
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// The reference dataset could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference dataset is not in the expected shape
    #[error("Invalid gazetteer data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<GazetteerError> for CrateError {
    fn from(err: GazetteerError) -> Self {
        CrateError::Gazetteer(err.to_string())
    }
}
