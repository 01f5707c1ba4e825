//! In-process store backing offline scans and tests.

use async_trait::async_trait;
use chrono::Utc;
use metrix_common::types::ProjectStatus;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_chunk_ownership, ArtifactStore, ProjectStore, StoreError, StoreResult};
use crate::models::{Artifact, ArtifactCounts, ArtifactMetrics, NewProject, Project};

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<Uuid, Project>,
    /// Registration order, so listings are stable
    project_order: Vec<Uuid>,
    artifacts: HashMap<Uuid, Vec<Artifact>>,
    /// Class ids per project, for method ownership checks
    class_ids: HashMap<Uuid, HashSet<Uuid>>,
}

/// [`ProjectStore`] and [`ArtifactStore`] over a single lock.
///
/// Every operation holds the write lock for its whole duration, which gives
/// the same all-or-nothing chunk visibility as a database transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, new: NewProject) -> StoreResult<Project> {
        let project = new.into_project();
        let mut tables = self.tables.write().await;
        tables.project_order.push(project.id);
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Project> {
        self.tables
            .read()
            .await
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::project_not_found(id))
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .project_order
            .iter()
            .filter_map(|id| tables.projects.get(id).cloned())
            .collect())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected: &[ProjectStatus],
        next: ProjectStatus,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| StoreError::project_not_found(id))?;

        if !expected.contains(&project.status) {
            return Ok(false);
        }

        project.status = next;
        project.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Err(StoreError::project_not_found(id));
        }
        tables.project_order.retain(|p| *p != id);
        tables.artifacts.remove(&id);
        tables.class_ids.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn insert_chunk(&self, project_id: Uuid, chunk: &[Artifact]) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&project_id) {
            return Err(StoreError::project_not_found(project_id));
        }

        let Tables {
            artifacts,
            class_ids,
            ..
        } = &mut *tables;
        let known = class_ids.entry(project_id).or_default();
        check_chunk_ownership(project_id, chunk, |class_id| known.contains(&class_id))?;

        known.extend(
            chunk
                .iter()
                .filter(|a| matches!(a.metrics, ArtifactMetrics::Class(_)))
                .map(|a| a.id),
        );
        artifacts.entry(project_id).or_default().extend_from_slice(chunk);
        Ok(chunk.len())
    }

    async fn delete_project_artifacts(&self, project_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        tables.class_ids.remove(&project_id);
        let removed = tables
            .artifacts
            .remove(&project_id)
            .map(|rows| rows.len() as u64)
            .unwrap_or(0);
        Ok(removed)
    }

    async fn list_artifacts(&self, project_id: Uuid) -> StoreResult<Vec<Artifact>> {
        Ok(self
            .tables
            .read()
            .await
            .artifacts
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_artifacts(&self, project_id: Uuid) -> StoreResult<ArtifactCounts> {
        let tables = self.tables.read().await;
        Ok(tables
            .artifacts
            .get(&project_id)
            .map(|rows| ArtifactCounts::tally(rows))
            .unwrap_or_default())
    }
}
