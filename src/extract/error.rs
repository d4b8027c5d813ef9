//! Error types for the extract module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for markup extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A CSS selector failed to compile
    #[error("Selector error: {selector}: {message}")]
    Selector { selector: String, message: String },
}

impl ExtractError {
    pub(crate) fn selector(selector: &str, err: impl std::fmt::Display) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ExtractError> for CrateError {
    fn from(err: ExtractError) -> Self {
        CrateError::Extract(err.to_string())
    }
}
