//! Common types used across Metrix

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetrixError;

/// Analysis lifecycle of a project.
///
/// `Added` is the initial state. A run moves the project to
/// `ProcessingFiles` and every run ends in exactly one of `Finished` or
/// `Error`. A restart re-enters `ProcessingFiles` from either terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Added,
    ProcessingFiles,
    Finished,
    Error,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Added,
        ProjectStatus::ProcessingFiles,
        ProjectStatus::Finished,
        ProjectStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Added => "added",
            ProjectStatus::ProcessingFiles => "processing_files",
            ProjectStatus::Finished => "finished",
            ProjectStatus::Error => "error",
        }
    }

    /// True while an analysis run owns the project.
    pub fn is_running(&self) -> bool {
        matches!(self, ProjectStatus::ProcessingFiles)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Added, ProcessingFiles)
                | (Finished, ProcessingFiles)
                | (Error, ProcessingFiles)
                | (ProcessingFiles, Finished)
                | (ProcessingFiles, Error)
        )
    }

    /// Every state that may legally move to `next`.
    pub fn predecessors_of(next: ProjectStatus) -> Vec<ProjectStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.can_transition_to(next))
            .collect()
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" => Ok(ProjectStatus::Added),
            "processing_files" => Ok(ProjectStatus::ProcessingFiles),
            "finished" => Ok(ProjectStatus::Finished),
            "error" => Ok(ProjectStatus::Error),
            _ => Err(MetrixError::InvalidStatus(s.to_string())),
        }
    }
}

/// Discriminant of a persisted artifact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Class,
    Method,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Class => "class",
            ArtifactKind::Method => "method",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(ArtifactKind::Class),
            "method" => Ok(ArtifactKind::Method),
            _ => Err(MetrixError::InvalidArtifactKind(s.to_string())),
        }
    }
}
