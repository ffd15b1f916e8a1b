//! Error types for hierarchy loading and document output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that terminate an aggregation run.
///
/// A missing hierarchy file is not an error; it is reported as a warning
/// and the part contributes nothing.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The hierarchy file exists but could not be read.
    #[error("Failed to read hierarchy file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The hierarchy file is not a valid list of hierarchy entries.
    #[error("Malformed hierarchy file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The layout settings cannot describe any part.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

pub type Result<T> = std::result::Result<T, AggregateError>;
