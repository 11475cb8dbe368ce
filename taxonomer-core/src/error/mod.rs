//! Core error types for Taxonomer

pub mod integrity;

use thiserror::Error;
pub use integrity::{IntegrityError, IntegrityErrorKind};

/// Main error type for Taxonomer operations
///
/// Only structural failures live here. Findings about individual changes
/// (rank skips, implausible moves, ambiguous migrations) are values carried
/// inside reports and never surface as errors.
#[derive(Error, Debug)]
pub enum TaxonomerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for Taxonomer operations
pub type TaxonomerResult<T> = Result<T, TaxonomerError>;

// Conversion implementations for common error types
impl From<serde_json::Error> for TaxonomerError {
    fn from(err: serde_json::Error) -> Self {
        TaxonomerError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for TaxonomerError {
    fn from(err: anyhow::Error) -> Self {
        TaxonomerError::Other(err.to_string())
    }
}
