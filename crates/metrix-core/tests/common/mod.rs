//! Shared fixtures for pipeline integration tests
//!
//! - [`TestEnv`]: temporary workspace, in-memory store and an orchestrator
//! - [`zip_archive`]: build archive bytes in memory
//! - [`FlakyStore`]: a store whose chunk commits start failing after a quota
#![allow(dead_code)]

use async_trait::async_trait;
use metrix_common::types::ProjectStatus;
use metrix_core::config::PipelineConfig;
use metrix_core::models::{Artifact, ArtifactCounts, NewProject, Project};
use metrix_core::pipeline::Orchestrator;
use metrix_core::store::{ArtifactStore, MemoryStore, ProjectStore, StoreError, StoreResult};
use metrix_core::workspace::Workspace;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use zip::write::SimpleFileOptions;

/// Entries for [`zip_archive`]; `None` contents make a directory entry.
pub type Entry<'a> = (&'a str, Option<&'a str>);

pub fn zip_archive(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in entries {
        match contents {
            Some(text) => {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .expect("start zip entry");
                writer.write_all(text.as_bytes()).expect("write zip entry");
            },
            None => writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("add zip directory"),
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

pub struct TestEnv<S: ProjectStore + ArtifactStore + 'static> {
    // Held so the workspace outlives the test
    pub dir: TempDir,
    pub store: Arc<S>,
    pub orchestrator: Orchestrator<S>,
}

impl TestEnv<MemoryStore> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }
}

impl<S: ProjectStore + ArtifactStore + 'static> TestEnv<S> {
    pub fn with_store(store: Arc<S>, config: PipelineConfig) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let orchestrator =
            Orchestrator::new(Arc::clone(&store), Workspace::new(dir.path()), config);
        Self {
            dir,
            store,
            orchestrator,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        self.orchestrator.workspace()
    }

    /// Register a project and upload `entries` as its archive.
    pub async fn project_with(&self, entries: &[Entry<'_>]) -> Uuid {
        let id = self
            .store
            .create_project(NewProject::new("fixture"))
            .await
            .expect("create project")
            .id;
        self.workspace()
            .store_archive(id, &zip_archive(entries))
            .expect("store archive");
        id
    }

    pub async fn status(&self, id: Uuid) -> ProjectStatus {
        self.store.get_project(id).await.expect("get project").status
    }

    pub async fn artifacts(&self, id: Uuid) -> Vec<Artifact> {
        self.store.list_artifacts(id).await.expect("list artifacts")
    }
}

/// Delegates to a [`MemoryStore`] but fails every chunk commit after the
/// first `allowed` ones.
pub struct FlakyStore {
    inner: MemoryStore,
    allowed: usize,
    commits: AtomicUsize,
}

impl FlakyStore {
    pub fn new(allowed: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            allowed,
            commits: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProjectStore for FlakyStore {
    async fn create_project(&self, new: NewProject) -> StoreResult<Project> {
        self.inner.create_project(new).await
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Project> {
        self.inner.get_project(id).await
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.inner.list_projects().await
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected: &[ProjectStatus],
        next: ProjectStatus,
    ) -> StoreResult<bool> {
        self.inner.transition_status(id, expected, next).await
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_project(id).await
    }
}

#[async_trait]
impl ArtifactStore for FlakyStore {
    async fn insert_chunk(&self, project_id: Uuid, chunk: &[Artifact]) -> StoreResult<usize> {
        if self.commits.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.insert_chunk(project_id, chunk).await
    }

    async fn delete_project_artifacts(&self, project_id: Uuid) -> StoreResult<u64> {
        self.inner.delete_project_artifacts(project_id).await
    }

    async fn list_artifacts(&self, project_id: Uuid) -> StoreResult<Vec<Artifact>> {
        self.inner.list_artifacts(project_id).await
    }

    async fn count_artifacts(&self, project_id: Uuid) -> StoreResult<ArtifactCounts> {
        self.inner.count_artifacts(project_id).await
    }
}
