//! Launches runs as detached tokio tasks.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use super::error::PipelineResult;
use super::jobs::{AnalysisJob, DeleteReport, RunReport};
use super::orchestrator::Orchestrator;
use super::status::check_claim;
use crate::store::Store;

/// Fire-and-forget front door for analysis, restart and delete triggers.
///
/// Triggers are checked before anything is spawned so that an unknown project
/// or a project that is already being analyzed is reported to the caller.
/// The returned handle may be awaited or dropped; dropping it does not
/// cancel the run.
pub struct Dispatcher<S: Store> {
    orchestrator: Arc<Orchestrator<S>>,
}

impl<S: Store> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<S: Store> Dispatcher<S> {
    pub fn new(orchestrator: Orchestrator<S>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<S> {
        &self.orchestrator
    }

    pub async fn start_analysis(
        &self,
        project_id: Uuid,
    ) -> PipelineResult<JoinHandle<PipelineResult<RunReport>>> {
        self.dispatch(AnalysisJob::fresh(project_id)).await
    }

    pub async fn restart_analysis(
        &self,
        project_id: Uuid,
    ) -> PipelineResult<JoinHandle<PipelineResult<RunReport>>> {
        self.dispatch(AnalysisJob::restart(project_id)).await
    }

    /// Spawn `job` once the project is known to exist and to be claimable by
    /// a run of its kind. The
    /// start step still claims the project atomically, so a race between two
    /// triggers ends with one of them failing `AlreadyRunning`.
    pub async fn dispatch(
        &self,
        job: AnalysisJob,
    ) -> PipelineResult<JoinHandle<PipelineResult<RunReport>>> {
        let project = self.orchestrator.store().get_project(job.project_id).await?;
        check_claim(job.project_id, job.kind, project.status)?;

        info!(project_id = %job.project_id, run_kind = %job.kind, "Dispatching analysis run");

        let orchestrator = Arc::clone(&self.orchestrator);
        Ok(tokio::spawn(async move { orchestrator.run(job).await }))
    }

    /// Spawn the delete flow, or the remove flow when `remove` is set.
    pub async fn delete_project(
        &self,
        project_id: Uuid,
        remove: bool,
    ) -> PipelineResult<JoinHandle<PipelineResult<DeleteReport>>> {
        self.orchestrator.store().get_project(project_id).await?;

        info!(project_id = %project_id, remove, "Dispatching project deletion");

        let orchestrator = Arc::clone(&self.orchestrator);
        Ok(tokio::spawn(async move {
            if remove {
                orchestrator.remove(project_id).await
            } else {
                orchestrator.delete(project_id).await
            }
        }))
    }
}
