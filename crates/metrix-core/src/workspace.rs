//! Per-project directories under one configured base.
//!
//! Layout for a project `id`:
//!
//! ```text
//! <base_dir>/project-<id>/
//!     archive.zip     uploaded archive
//!     sources/        extraction root
//! ```

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

const ARCHIVE_FILE_NAME: &str = "archive.zip";
const SOURCE_DIR_NAME: &str = "sources";

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Uploaded archive for project '{0}' is empty")]
    EmptyUpload(Uuid),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Outcome of a best-effort purge
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub removed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    base_dir: PathBuf,
}

impl Workspace {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Project directory path; nothing is created.
    pub fn project_dir(&self, project_id: Uuid) -> PathBuf {
        self.base_dir.join(format!("project-{}", project_id))
    }

    /// The project directory, created on demand.
    pub fn resource_root(&self, project_id: Uuid) -> WorkspaceResult<PathBuf> {
        let root = self.project_dir(project_id);
        create_dir(&root)?;
        Ok(root)
    }

    pub fn archive_path(&self, project_id: Uuid) -> WorkspaceResult<PathBuf> {
        Ok(self.resource_root(project_id)?.join(ARCHIVE_FILE_NAME))
    }

    /// Extraction root; created on demand.
    pub fn source_root(&self, project_id: Uuid) -> WorkspaceResult<PathBuf> {
        let dir = self.resource_root(project_id)?.join(SOURCE_DIR_NAME);
        create_dir(&dir)?;
        Ok(dir)
    }

    /// Store uploaded archive bytes as the project's archive, replacing any
    /// previous upload.
    pub fn store_archive(&self, project_id: Uuid, bytes: &[u8]) -> WorkspaceResult<PathBuf> {
        if bytes.is_empty() {
            return Err(WorkspaceError::EmptyUpload(project_id));
        }

        let path = self.archive_path(project_id)?;
        std::fs::write(&path, bytes).map_err(|source| WorkspaceError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(project_id = %project_id, bytes = bytes.len(), "Stored project archive");
        Ok(path)
    }

    /// Delete the project directory, children before parents.
    ///
    /// A missing directory is not an error. A path that cannot be removed is
    /// logged and recorded, and the walk carries on with its siblings.
    pub fn purge(&self, project_id: Uuid) -> PurgeReport {
        let root = self.project_dir(project_id);
        let mut report = PurgeReport::default();

        if !root.exists() {
            return report;
        }

        for entry in WalkDir::new(&root).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    warn!(path = %path.display(), error = %e, "Failed to visit path during purge");
                    report.failures.push((path, e.to_string()));
                    continue;
                },
            };

            let path = entry.path();
            let result = if entry.file_type().is_dir() {
                std::fs::remove_dir(path)
            } else {
                std::fs::remove_file(path)
            };

            match result {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {},
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to delete path during purge");
                    report.failures.push((path.to_path_buf(), e.to_string()));
                },
            }
        }

        debug!(
            project_id = %project_id,
            removed = report.removed,
            failed = report.failures.len(),
            "Purged project workspace"
        );

        report
    }
}

fn create_dir(path: &Path) -> WorkspaceResult<()> {
    std::fs::create_dir_all(path).map_err(|source| WorkspaceError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
