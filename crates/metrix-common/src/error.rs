//! Error types shared across Metrix crates

use thiserror::Error;

/// Result type alias for shared Metrix operations
pub type Result<T> = std::result::Result<T, MetrixError>;

/// Errors raised by the shared layer.
///
/// Component crates wrap these in their own error enums; decoding a stored
/// status or artifact kind is the usual source.
#[derive(Error, Debug)]
pub enum MetrixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid project status: {0}")]
    InvalidStatus(String),

    #[error("Invalid artifact kind: {0}")]
    InvalidArtifactKind(String),
}
