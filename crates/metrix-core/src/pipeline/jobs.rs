//! Run triggers and the statistics a run produces

use chrono::{DateTime, Utc};
use metrix_common::types::ProjectStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ErrorKind;
use super::steps::StepKind;

/// Fresh analysis or restart after purging previous artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Fresh,
    Restart,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Fresh => "fresh",
            RunKind::Restart => "restart",
        }
    }

    /// Statuses a run of this kind may claim a project from. A fresh run has
    /// no purge step, so it only takes projects nothing was persisted for.
    pub fn claimable_from(&self) -> Vec<ProjectStatus> {
        match self {
            RunKind::Fresh => vec![ProjectStatus::Added],
            RunKind::Restart => ProjectStatus::predecessors_of(ProjectStatus::ProcessingFiles),
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis trigger payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub project_id: Uuid,
    pub kind: RunKind,
    /// User or system that requested the run
    pub triggered_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisJob {
    pub fn new(project_id: Uuid, kind: RunKind) -> Self {
        Self {
            project_id,
            kind,
            triggered_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn fresh(project_id: Uuid) -> Self {
        Self::new(project_id, RunKind::Fresh)
    }

    pub fn restart(project_id: Uuid) -> Self {
        Self::new(project_id, RunKind::Restart)
    }

    /// Set the user who triggered this job
    pub fn with_triggered_by(mut self, user_id: Uuid) -> Self {
        self.triggered_by = Some(user_id);
        self
    }
}

/// A file that contributed no artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWarning {
    pub path: String,
    pub message: String,
}

/// The step that ended a run, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: StepKind,
    pub kind: ErrorKind,
    pub message: String,
}

/// Statistics collected during one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub project_id: Uuid,
    pub run_kind: RunKind,
    /// Artifacts deleted by the purge step of a restart
    pub artifacts_purged: u64,
    pub files_extracted: usize,
    pub files_discovered: usize,
    pub files_analyzed: usize,
    pub files_failed: usize,
    pub warnings: Vec<FileWarning>,
    pub classes_persisted: u64,
    pub methods_persisted: u64,
    pub chunks_committed: u64,
    /// Status the run left the project in
    pub status: ProjectStatus,
    pub failure: Option<StepFailure>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Duration in seconds
    pub duration_secs: f64,
}

impl RunReport {
    pub fn new(job: &AnalysisJob) -> Self {
        Self {
            project_id: job.project_id,
            run_kind: job.kind,
            artifacts_purged: 0,
            files_extracted: 0,
            files_discovered: 0,
            files_analyzed: 0,
            files_failed: 0,
            warnings: Vec::new(),
            classes_persisted: 0,
            methods_persisted: 0,
            chunks_committed: 0,
            status: ProjectStatus::ProcessingFiles,
            failure: None,
            started_at: Utc::now(),
            completed_at: None,
            duration_secs: 0.0,
        }
    }

    /// Mark stats as completed
    pub fn complete(&mut self) {
        let end = Utc::now();
        self.completed_at = Some(end);
        self.duration_secs = (end - self.started_at).num_milliseconds() as f64 / 1000.0;
    }

    pub fn record_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.files_failed += 1;
        self.warnings.push(FileWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn artifacts_persisted(&self) -> u64 {
        self.classes_persisted + self.methods_persisted
    }

    pub fn is_success(&self) -> bool {
        self.status == ProjectStatus::Finished
    }
}

/// What a delete or remove flow cleaned up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub project_id: Uuid,
    pub artifacts_removed: u64,
    pub workspace_entries_removed: usize,
    /// Paths the best-effort workspace purge could not delete
    pub workspace_failures: Vec<String>,
    pub project_removed: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_job_constructors() {
        let id = Uuid::new_v4();
        let user = Uuid::new_v4();

        let job = AnalysisJob::restart(id).with_triggered_by(user);
        assert_eq!(job.kind, RunKind::Restart);
        assert_eq!(job.triggered_by, Some(user));
        assert_eq!(AnalysisJob::fresh(id).kind.to_string(), "fresh");
    }

    #[test]
    fn test_report_complete_and_warnings() {
        let mut report = RunReport::new(&AnalysisJob::fresh(Uuid::new_v4()));
        assert!(report.completed_at.is_none());
        assert!(!report.is_success());

        report.record_warning("a/B.java", "Syntax error near line 3");
        report.classes_persisted = 2;
        report.methods_persisted = 5;
        report.complete();

        assert_eq!(report.files_failed, 1);
        assert_eq!(report.warnings[0].path, "a/B.java");
        assert_eq!(report.artifacts_persisted(), 7);
        assert!(report.completed_at.is_some());
        assert!(report.duration_secs >= 0.0);
    }
}
