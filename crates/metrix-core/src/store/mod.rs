//! Persistence boundary driven by the pipeline.
//!
//! The orchestrator only talks to [`ProjectStore`] and [`ArtifactStore`].
//! [`crate::db::PgStore`] backs them with Postgres; [`MemoryStore`] keeps
//! everything in process for offline scans and tests.

pub mod memory;

use async_trait::async_trait;
use metrix_common::types::ProjectStatus;
use metrix_common::MetrixError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Artifact, ArtifactCounts, ArtifactMetrics, NewProject, Project};

pub use memory::MemoryStore;

/// Persistence failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The write would break an ownership invariant
    #[error("Rejected write: {0}")]
    Invalid(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(#[from] MetrixError),
}

impl StoreError {
    pub fn project_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Project",
            id,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Project rows and their lifecycle status
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Register a project in status `Added`.
    async fn create_project(&self, new: NewProject) -> StoreResult<Project>;

    /// Fetch one project; `NotFound` when absent.
    async fn get_project(&self, id: Uuid) -> StoreResult<Project>;

    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Move the project to `next` only if its current status is one of
    /// `expected`. Returns whether the swap happened; `NotFound` when the
    /// project does not exist.
    async fn transition_status(
        &self,
        id: Uuid,
        expected: &[ProjectStatus],
        next: ProjectStatus,
    ) -> StoreResult<bool>;

    /// Remove the project row. Callers purge artifacts first.
    async fn delete_project(&self, id: Uuid) -> StoreResult<()>;
}

/// Artifact rows, partitioned by project
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist one chunk atomically: either every artifact is visible
    /// afterwards or none is. Returns the number of rows written.
    async fn insert_chunk(&self, project_id: Uuid, chunk: &[Artifact]) -> StoreResult<usize>;

    /// Delete every artifact of the project. Returns the number removed.
    async fn delete_project_artifacts(&self, project_id: Uuid) -> StoreResult<u64>;

    /// All artifacts of the project in insertion order.
    async fn list_artifacts(&self, project_id: Uuid) -> StoreResult<Vec<Artifact>>;

    async fn count_artifacts(&self, project_id: Uuid) -> StoreResult<ArtifactCounts>;
}

/// Everything the orchestrator needs from persistence
pub trait Store: ProjectStore + ArtifactStore + 'static {}

impl<T> Store for T where T: ProjectStore + ArtifactStore + 'static {}

/// Reject a chunk that would cross project boundaries.
///
/// Methods must name a class from the same project; classes that are not in
/// this chunk are looked up through `known_class`.
pub(crate) fn check_chunk_ownership(
    project_id: Uuid,
    chunk: &[Artifact],
    mut known_class: impl FnMut(Uuid) -> bool,
) -> StoreResult<()> {
    let mut chunk_classes = std::collections::HashSet::new();

    for artifact in chunk {
        if artifact.project_id != project_id {
            return Err(StoreError::invalid(format!(
                "artifact '{}' belongs to project '{}', not '{}'",
                artifact.id, artifact.project_id, project_id
            )));
        }

        if artifact.lines_of_code < 1 {
            return Err(StoreError::invalid(format!(
                "artifact '{}' has non-positive lines of code ({})",
                artifact.name, artifact.lines_of_code
            )));
        }

        match &artifact.metrics {
            ArtifactMetrics::Class(_) => {
                chunk_classes.insert(artifact.id);
            },
            ArtifactMetrics::Method(method) => {
                if !chunk_classes.contains(&method.class_id) && !known_class(method.class_id) {
                    return Err(StoreError::invalid(format!(
                        "method '{}' references class '{}' outside project '{}'",
                        artifact.name, method.class_id, project_id
                    )));
                }
            },
        }
    }

    Ok(())
}
