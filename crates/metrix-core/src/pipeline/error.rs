//! Pipeline error taxonomy

use metrix_common::types::ProjectStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::AnalysisError;
use crate::archive::ArchiveError;
use crate::store::StoreError;
use crate::workspace::WorkspaceError;

/// Coarse failure class callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Archive missing, unreadable, empty, or hostile
    Input,
    /// A single source file could not be parsed
    Parse,
    /// A store read or write failed
    Persistence,
    NotFound,
    /// Another run owns the project
    AlreadyRunning,
    /// A fresh run was asked for on a project that already had one
    AlreadyAnalyzed,
    /// The workspace directory could not be prepared
    Workspace,
    /// Lifecycle or task plumbing broke
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Parse => "parse",
            ErrorKind::Persistence => "persistence",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyRunning => "already_running",
            ErrorKind::AlreadyAnalyzed => "already_analyzed",
            ErrorKind::Workspace => "workspace",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Project '{0}' not found")]
    NotFound(Uuid),

    #[error("Project '{0}' already has an analysis run in progress")]
    AlreadyRunning(Uuid),

    #[error("Project '{id}' was already analyzed (status {status}); restart the analysis to replace its results")]
    AlreadyAnalyzed { id: Uuid, status: ProjectStatus },

    #[error("Project '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("Archive extraction failed: {0}")]
    Input(#[from] ArchiveError),

    #[error("No '{suffix}' source files under {}", .root.display())]
    NoSourceFiles { root: PathBuf, suffix: String },

    #[error("Failed to enumerate source files: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    #[error("Analysis failed: {0}")]
    Parse(#[from] AnalysisError),

    #[error("Pipeline task failed: {0}")]
    Task(String),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => PipelineError::NotFound(id),
            other => PipelineError::Persistence(other),
        }
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::Task(err.to_string())
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::AlreadyRunning(_) => ErrorKind::AlreadyRunning,
            PipelineError::AlreadyAnalyzed { .. } => ErrorKind::AlreadyAnalyzed,
            PipelineError::Input(_)
            | PipelineError::NoSourceFiles { .. }
            | PipelineError::Discovery(_)
            | PipelineError::Workspace(WorkspaceError::EmptyUpload(_)) => ErrorKind::Input,
            PipelineError::Workspace(_) => ErrorKind::Workspace,
            PipelineError::Persistence(_) => ErrorKind::Persistence,
            PipelineError::Parse(_) => ErrorKind::Parse,
            PipelineError::InvalidTransition { .. } | PipelineError::Task(_) => ErrorKind::Internal,
        }
    }

    /// Message followed by every underlying cause, `: `-separated.
    pub fn cause_chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let id = Uuid::new_v4();
        let err = PipelineError::from(StoreError::project_not_found(id));
        assert!(matches!(err, PipelineError::NotFound(found) if found == id));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = PipelineError::from(StoreError::invalid("bad chunk"));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_input_errors() {
        let missing = PipelineError::from(ArchiveError::Missing(PathBuf::from("a.zip")));
        assert_eq!(missing.kind(), ErrorKind::Input);

        let traversal = PipelineError::from(ArchiveError::PathTraversal("../x".into()));
        assert_eq!(traversal.kind(), ErrorKind::Input);

        let empty = PipelineError::from(WorkspaceError::EmptyUpload(Uuid::new_v4()));
        assert_eq!(empty.kind(), ErrorKind::Input);

        let none = PipelineError::NoSourceFiles {
            root: PathBuf::from("/tmp/src"),
            suffix: ".java".into(),
        };
        assert_eq!(none.kind(), ErrorKind::Input);
        assert_eq!(none.to_string(), "No '.java' source files under /tmp/src");
    }

    #[test]
    fn test_cause_chain_includes_io_source() {
        let err = PipelineError::from(ArchiveError::Io {
            path: PathBuf::from("/tmp/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let chain = err.cause_chain();
        assert!(chain.starts_with("Archive extraction failed"));
        assert!(chain.contains("denied"));
    }
}
