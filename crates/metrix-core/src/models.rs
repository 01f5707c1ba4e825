//! Persisted domain records: projects and their metric artifacts.

use chrono::{DateTime, Utc};
use metrix_common::types::{ArtifactKind, ProjectStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered project (maps to the `projects` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Reference to the owning user; users themselves live outside this crate
    pub owner_id: Option<Uuid>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: Option<Uuid>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Build the row a store inserts: fresh id, status `Added`, timestamps now.
    pub fn into_project(self) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            status: ProjectStatus::Added,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One persisted metrics record.
///
/// Fields shared by both kinds live here; the kind-specific payload is in
/// [`ArtifactMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub lines_of_code: i32,
    pub metrics: ArtifactMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactMetrics {
    Class(ClassMetrics),
    Method(MethodMetrics),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub package: Option<String>,
    /// Path of the declaring file, relative to the extracted source root
    pub source_path: String,
    pub number_attributes: i32,
    pub number_methods: i32,
    pub dit: i32,
    pub cbo: i32,
    pub noc: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetrics {
    /// Owning class artifact; always in the same project
    pub class_id: Uuid,
    pub class_name: String,
    pub parameter_count: i32,
    pub cyclomatic_complexity: i32,
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self.metrics {
            ArtifactMetrics::Class(_) => ArtifactKind::Class,
            ArtifactMetrics::Method(_) => ArtifactKind::Method,
        }
    }

    pub fn as_class(&self) -> Option<&ClassMetrics> {
        match &self.metrics {
            ArtifactMetrics::Class(class) => Some(class),
            ArtifactMetrics::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodMetrics> {
        match &self.metrics {
            ArtifactMetrics::Method(method) => Some(method),
            ArtifactMetrics::Class(_) => None,
        }
    }
}

/// Per-kind row counts for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCounts {
    pub classes: u64,
    pub methods: u64,
}

impl ArtifactCounts {
    pub fn total(&self) -> u64 {
        self.classes + self.methods
    }

    pub fn record(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Class => self.classes += 1,
            ArtifactKind::Method => self.methods += 1,
        }
    }

    pub fn tally<'a>(artifacts: impl IntoIterator<Item = &'a Artifact>) -> Self {
        artifacts.into_iter().fold(Self::default(), |mut counts, artifact| {
            counts.record(artifact.kind());
            counts
        })
    }
}
