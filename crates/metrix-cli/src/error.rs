//! Error types for the Metrix CLI
//!
//! Messages are user-facing and point at the usual fix.

use metrix_core::analysis::AnalysisError;
use metrix_core::db::DbError;
use metrix_core::pipeline::PipelineError;
use metrix_core::store::StoreError;
use metrix_core::workspace::WorkspaceError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    #[error("{0}")]
    Database(#[from] DbError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Workspace error: {0}. Check METRIX_WORKSPACE_DIR and its permissions.")]
    Workspace(#[from] WorkspaceError),

    #[error("Could not analyze file: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}
