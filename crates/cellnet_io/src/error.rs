//! Error types for cellnet_io crate.

use cellnet_core::GridError;
use thiserror::Error;

/// Main error type for cellnet_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Rkyv archive errors
    #[error("Rkyv error: {0}")]
    Rkyv(String),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Malformed or truncated save data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Save written by a newer or unknown format revision
    #[error("Unsupported save version: {0}")]
    UnsupportedVersion(u32),

    /// Decoded nodes do not form a valid grid
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Result type alias for cellnet_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn rkyv<S: Into<String>>(msg: S) -> Self {
        Self::Rkyv(msg.into())
    }

    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
