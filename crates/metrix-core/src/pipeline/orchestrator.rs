//! Runs the steps of an analysis job against a store and a workspace.
//!
//! A run is `start -> [purge artifacts] -> extract -> analyze and persist ->
//! finish`. When any step after `start` fails the failure handler moves the
//! project to `Error`, records the failure on the [`RunReport`] and stops;
//! chunks committed before the failure stay in the store.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use metrix_common::types::ProjectStatus;

use super::chunk::{ChunkStats, ChunkWriter};
use super::error::{PipelineError, PipelineResult};
use super::jobs::{AnalysisJob, DeleteReport, RunReport, StepFailure};
use super::source::SourceFileSet;
use super::status::StatusTracker;
use super::steps::{Pipeline, StepKind};
use crate::analysis::{self, TypeGraph};
use crate::archive;
use crate::config::PipelineConfig;
use crate::store::Store;
use crate::workspace::Workspace;

/// State threaded through the steps of one run
struct RunContext {
    project_id: Uuid,
    source_root: Option<PathBuf>,
    report: RunReport,
}

pub struct Orchestrator<S: Store> {
    store: Arc<S>,
    workspace: Workspace,
    config: PipelineConfig,
    status: StatusTracker<S>,
}

impl<S: Store> Orchestrator<S> {
    pub fn new(store: Arc<S>, workspace: Workspace, config: PipelineConfig) -> Self {
        let status = StatusTracker::new(Arc::clone(&store));
        Self {
            store,
            workspace,
            config,
            status,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute one analysis run to completion.
    ///
    /// Returns `Err` only when the run could not claim the project (unknown
    /// project, a run already in progress, or a fresh run on a project that
    /// was analyzed before); the status is untouched then.
    /// Every later failure is absorbed by the failure handler and shows up as
    /// `status == Error` on the returned report.
    pub async fn run(&self, job: AnalysisJob) -> PipelineResult<RunReport> {
        let pipeline = Pipeline::for_run(job.kind);
        let mut ctx = RunContext {
            project_id: job.project_id,
            source_root: None,
            report: RunReport::new(&job),
        };

        info!(
            project_id = %job.project_id,
            run_kind = %pipeline.run_kind(),
            steps = pipeline.steps().len(),
            "Starting analysis run"
        );

        for step in pipeline.steps() {
            debug!(project_id = %ctx.project_id, step = %step.kind, "Step started");

            if let Err(e) = self.run_step(step.kind, &mut ctx).await {
                if !step.marks_error {
                    warn!(project_id = %ctx.project_id, step = %step.kind, error = %e, "Run not started");
                    return Err(e);
                }

                self.handle_failure(&mut ctx, step.kind, &e).await;
                ctx.report.complete();
                return Ok(ctx.report);
            }

            debug!(project_id = %ctx.project_id, step = %step.kind, "Step completed");
        }

        ctx.report.complete();
        info!(
            project_id = %ctx.project_id,
            files = ctx.report.files_analyzed,
            failed_files = ctx.report.files_failed,
            classes = ctx.report.classes_persisted,
            methods = ctx.report.methods_persisted,
            chunks = ctx.report.chunks_committed,
            duration_secs = ctx.report.duration_secs,
            "Analysis run finished"
        );

        Ok(ctx.report)
    }

    async fn run_step(&self, step: StepKind, ctx: &mut RunContext) -> PipelineResult<()> {
        match step {
            StepKind::Start => {
                self.status
                    .begin_run(ctx.project_id, ctx.report.run_kind)
                    .await
            },
            StepKind::PurgeArtifacts => {
                let removed = self.store.delete_project_artifacts(ctx.project_id).await?;
                ctx.report.artifacts_purged = removed;
                info!(project_id = %ctx.project_id, removed, "Purged previous artifacts");
                Ok(())
            },
            StepKind::Extract => self.extract(ctx).await,
            StepKind::AnalyzeAndPersist => self.analyze_and_persist(ctx).await,
            StepKind::Finish => {
                self.status.finish(ctx.project_id).await?;
                ctx.report.status = ProjectStatus::Finished;
                Ok(())
            },
        }
    }

    async fn extract(&self, ctx: &mut RunContext) -> PipelineResult<()> {
        let archive_path = self.workspace.archive_path(ctx.project_id)?;
        let source_root = self.workspace.source_root(ctx.project_id)?;

        let summary = archive::extract_blocking(archive_path, source_root.clone()).await?;
        ctx.report.files_extracted = summary.files;
        ctx.source_root = Some(source_root);
        Ok(())
    }

    async fn analyze_and_persist(&self, ctx: &mut RunContext) -> PipelineResult<()> {
        let root = match &ctx.source_root {
            Some(root) => root.clone(),
            None => self.workspace.source_root(ctx.project_id)?,
        };

        let suffix = self.config.source_suffix.clone();
        let discover_root = root.clone();
        let files = tokio::task::spawn_blocking(move || SourceFileSet::discover(discover_root, &suffix))
            .await??;

        if files.is_empty() {
            return Err(PipelineError::NoSourceFiles {
                root,
                suffix: self.config.source_suffix.clone(),
            });
        }
        ctx.report.files_discovered = files.len();
        info!(project_id = %ctx.project_id, files = files.len(), "Source files discovered");

        let graph = if self.config.compute_noc {
            let paths = files.files().to_vec();
            let graph = tokio::task::spawn_blocking(move || analysis::build_type_graph(&paths)).await?;
            debug!(
                project_id = %ctx.project_id,
                types = graph.type_count(),
                edges = graph.edge_count(),
                "Type graph collected"
            );
            Some(Arc::new(graph))
        } else {
            None
        };

        let mut writer = ChunkWriter::new(self.store.as_ref(), ctx.project_id, self.config.chunk_size);
        let result = self.feed(&files, graph, &mut writer, &mut ctx.report).await;

        let result = match result {
            Ok(()) => writer.flush().await.map_err(PipelineError::from),
            Err(e) => Err(e),
        };

        record_chunks(&mut ctx.report, writer.stats());
        result
    }

    /// Analyze `files` batch by batch and queue their artifacts in file
    /// enumeration order.
    async fn feed(
        &self,
        files: &SourceFileSet,
        graph: Option<Arc<TypeGraph>>,
        writer: &mut ChunkWriter<'_, S>,
        report: &mut RunReport,
    ) -> PipelineResult<()> {
        let project_id = report.project_id;

        for batch in files.batches(self.config.parse_batch_size) {
            let root = files.root().to_path_buf();
            let paths = batch.to_vec();
            let graph = graph.clone();

            let outcomes = tokio::task::spawn_blocking(move || {
                analysis::analyze_batch(&root, &paths, graph.as_deref())
            })
            .await?;

            for outcome in outcomes {
                match outcome.result {
                    Ok(metrics) => {
                        report.files_analyzed += 1;
                        writer.extend(metrics.into_artifacts(project_id)).await?;
                    },
                    Err(e) => {
                        warn!(
                            project_id = %project_id,
                            path = %outcome.relative,
                            error = %e,
                            "Skipping file that could not be analyzed"
                        );
                        report.record_warning(outcome.relative, e.to_string());
                    },
                }
            }
        }

        Ok(())
    }

    /// Failure handler: project to `Error`, cause logged and recorded.
    async fn handle_failure(&self, ctx: &mut RunContext, step: StepKind, err: &PipelineError) {
        error!(
            project_id = %ctx.project_id,
            step = %step,
            kind = %err.kind(),
            error = %err.cause_chain(),
            "Analysis step failed"
        );

        ctx.report.failure = Some(StepFailure {
            step,
            kind: err.kind(),
            message: err.cause_chain(),
        });

        match self.status.fail(ctx.project_id).await {
            Ok(()) => ctx.report.status = ProjectStatus::Error,
            Err(e) => {
                error!(project_id = %ctx.project_id, error = %e, "Failed to record error status");
                if let Ok(current) = self.status.current(ctx.project_id).await {
                    ctx.report.status = current;
                }
            },
        }
    }

    /// Delete flow: every artifact of the project, then its workspace.
    /// The project row and its status are left alone.
    pub async fn delete(&self, project_id: Uuid) -> PipelineResult<DeleteReport> {
        self.store.get_project(project_id).await?;

        let artifacts_removed = self.store.delete_project_artifacts(project_id).await?;

        let workspace = self.workspace.clone();
        let purge = tokio::task::spawn_blocking(move || workspace.purge(project_id)).await?;

        if !purge.is_clean() {
            warn!(
                project_id = %project_id,
                failures = purge.failures.len(),
                "Workspace purge left paths behind"
            );
        }

        info!(
            project_id = %project_id,
            artifacts_removed,
            workspace_entries_removed = purge.removed,
            "Project data deleted"
        );

        Ok(DeleteReport {
            project_id,
            artifacts_removed,
            workspace_entries_removed: purge.removed,
            workspace_failures: purge
                .failures
                .into_iter()
                .map(|(path, _)| path.display().to_string())
                .collect(),
            project_removed: false,
        })
    }

    /// Delete flow followed by dropping the project registration.
    pub async fn remove(&self, project_id: Uuid) -> PipelineResult<DeleteReport> {
        let mut report = self.delete(project_id).await?;
        self.store.delete_project(project_id).await?;
        report.project_removed = true;

        info!(project_id = %project_id, "Project removed");
        Ok(report)
    }
}

fn record_chunks(report: &mut RunReport, stats: ChunkStats) {
    report.chunks_committed = stats.chunks;
    report.classes_persisted = stats.counts.classes;
    report.methods_persisted = stats.counts.methods;
}
