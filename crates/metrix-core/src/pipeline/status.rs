//! Project status transitions driven by a run.
//!
//! Every write is a compare-and-swap against the statuses that may legally
//! precede the target, so two runs can never both claim a project and a
//! terminal status is only ever written over `ProcessingFiles`.

use metrix_common::types::ProjectStatus;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{PipelineError, PipelineResult};
use super::jobs::RunKind;
use crate::store::ProjectStore;

/// Refuse a run of `kind` against a project currently in `status`.
pub fn check_claim(project_id: Uuid, kind: RunKind, status: ProjectStatus) -> PipelineResult<()> {
    if status.is_running() {
        return Err(PipelineError::AlreadyRunning(project_id));
    }
    if !kind.claimable_from().contains(&status) {
        return Err(PipelineError::AlreadyAnalyzed {
            id: project_id,
            status,
        });
    }
    Ok(())
}

pub struct StatusTracker<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for StatusTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ProjectStore + ?Sized> StatusTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Claim the project for a run of `kind`, moving it to
    /// `ProcessingFiles`. Fresh runs only claim `Added` projects.
    pub async fn begin_run(&self, project_id: Uuid, kind: RunKind) -> PipelineResult<()> {
        let claimed = self
            .swap(project_id, &kind.claimable_from(), ProjectStatus::ProcessingFiles)
            .await?;
        if !claimed {
            let current = self.current(project_id).await?;
            check_claim(project_id, kind, current)?;
            // Lost a race that has since settled
            return Err(PipelineError::AlreadyRunning(project_id));
        }

        info!(project_id = %project_id, run_kind = %kind, "Project claimed for analysis");
        Ok(())
    }

    pub async fn finish(&self, project_id: Uuid) -> PipelineResult<()> {
        self.end_run(project_id, ProjectStatus::Finished).await
    }

    pub async fn fail(&self, project_id: Uuid) -> PipelineResult<()> {
        self.end_run(project_id, ProjectStatus::Error).await
    }

    pub async fn current(&self, project_id: Uuid) -> PipelineResult<ProjectStatus> {
        Ok(self.store.get_project(project_id).await?.status)
    }

    async fn end_run(&self, project_id: Uuid, next: ProjectStatus) -> PipelineResult<()> {
        if self
            .swap(project_id, &ProjectStatus::predecessors_of(next), next)
            .await?
        {
            return Ok(());
        }

        let from = self.current(project_id).await?;
        Err(PipelineError::InvalidTransition {
            id: project_id,
            from,
            to: next,
        })
    }

    async fn swap(
        &self,
        project_id: Uuid,
        expected: &[ProjectStatus],
        next: ProjectStatus,
    ) -> PipelineResult<bool> {
        let swapped = self
            .store
            .transition_status(project_id, expected, next)
            .await?;

        debug!(project_id = %project_id, status = %next, swapped, "Status transition");
        Ok(swapped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::NewProject;
    use crate::store::MemoryStore;

    async fn setup() -> (StatusTracker<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let project = store.create_project(NewProject::new("demo")).await.unwrap();
        (StatusTracker::new(store), project.id)
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (tracker, id) = setup().await;
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::Added);

        tracker.begin_run(id, RunKind::Fresh).await.unwrap();
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::ProcessingFiles);

        tracker.finish(id).await.unwrap();
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::Finished);

        // restart from a terminal state
        tracker.begin_run(id, RunKind::Restart).await.unwrap();
        tracker.fail(id).await.unwrap();
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::Error);
    }

    #[tokio::test]
    async fn test_second_claim_is_rejected() {
        let (tracker, id) = setup().await;
        tracker.begin_run(id, RunKind::Fresh).await.unwrap();

        for kind in [RunKind::Fresh, RunKind::Restart] {
            let err = tracker.begin_run(id, kind).await.unwrap_err();
            assert!(matches!(err, PipelineError::AlreadyRunning(_)));
        }
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::ProcessingFiles);
    }

    #[tokio::test]
    async fn test_fresh_claim_requires_added_project() {
        let (tracker, id) = setup().await;
        tracker.begin_run(id, RunKind::Fresh).await.unwrap();
        tracker.fail(id).await.unwrap();

        let err = tracker.begin_run(id, RunKind::Fresh).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AlreadyAnalyzed {
                status: ProjectStatus::Error,
                ..
            }
        ));
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::Error);

        tracker.begin_run(id, RunKind::Restart).await.unwrap();
        assert_eq!(tracker.current(id).await.unwrap(), ProjectStatus::ProcessingFiles);
    }

    #[test]
    fn test_check_claim() {
        let id = Uuid::new_v4();
        assert!(check_claim(id, RunKind::Fresh, ProjectStatus::Added).is_ok());
        assert!(check_claim(id, RunKind::Restart, ProjectStatus::Added).is_ok());
        assert!(check_claim(id, RunKind::Restart, ProjectStatus::Finished).is_ok());
        assert!(matches!(
            check_claim(id, RunKind::Fresh, ProjectStatus::Finished),
            Err(PipelineError::AlreadyAnalyzed { .. })
        ));
        assert!(matches!(
            check_claim(id, RunKind::Restart, ProjectStatus::ProcessingFiles),
            Err(PipelineError::AlreadyRunning(_))
        ));
    }

    #[tokio::test]
    async fn test_terminal_status_requires_running_project() {
        let (tracker, id) = setup().await;

        let err = tracker.finish(id).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidTransition {
                from: ProjectStatus::Added,
                to: ProjectStatus::Finished,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let (tracker, _) = setup().await;
        let err = tracker.begin_run(Uuid::new_v4(), RunKind::Fresh).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}
