//! Error taxonomy for the conditioning pipeline.

use std::path::PathBuf;

/// Errors raised by loading, conditioning and exporting a recording.
///
/// Every stage validates its inputs at its own boundary and returns one of
/// these immediately. A stage that is skipped because its configuration is
/// unset never produces an error.
#[derive(Debug, thiserror::Error)]
pub enum ConditioningError {
    /// Empty or mismatched-length sequences.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A malformed row in a source recording.
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Cutoff ratio out of range or a bad median window.
    #[error("invalid filter parameters: {0}")]
    InvalidFilterParameters(String),

    /// Non-positive measurement variance and friends.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The source or export file could not be opened or written.
    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConditioningError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConditioningError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConditioningError>;
