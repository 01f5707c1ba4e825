//! CLI command implementations
//!
//! Database-backed commands share [`Session`]; `inspect` and `scan` work
//! offline.

pub mod inspect;
pub mod project;
pub mod run;
pub mod scan;

use colored::Colorize;
use metrix_common::types::ProjectStatus;
use metrix_core::config::Config;
use metrix_core::db::{self, PgStore};
use metrix_core::pipeline::{Dispatcher, Orchestrator, RunReport};
use metrix_core::workspace::Workspace;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

/// Configuration plus a connected Postgres store
pub struct Session {
    pub config: Config,
    pub store: Arc<PgStore>,
}

impl Session {
    pub async fn connect() -> Result<Self> {
        let config = Config::load()?;
        let pool = db::create_pool(&config.database).await?;
        db::health_check(&pool).await?;
        debug!(max_connections = config.database.max_connections, "Connected to database");

        Ok(Self {
            config,
            store: Arc::new(PgStore::new(pool)),
        })
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.config.workspace.base_dir)
    }

    pub fn dispatcher(&self) -> Dispatcher<PgStore> {
        Dispatcher::new(Orchestrator::new(
            Arc::clone(&self.store),
            self.workspace(),
            self.config.pipeline.clone(),
        ))
    }
}

/// `metrix migrate`
pub async fn migrate() -> Result<()> {
    let session = Session::connect().await?;
    db::run_migrations(session.store.pool()).await?;
    println!("{}", "Migrations applied".green());
    Ok(())
}

pub(crate) fn colored_status(status: ProjectStatus) -> colored::ColoredString {
    match status {
        ProjectStatus::Added => status.as_str().normal(),
        ProjectStatus::ProcessingFiles => status.as_str().yellow(),
        ProjectStatus::Finished => status.as_str().green(),
        ProjectStatus::Error => status.as_str().red(),
    }
}

pub(crate) fn print_run_report(report: &RunReport) {
    println!("{} {}", "Run:".cyan().bold(), report.run_kind);
    println!("  Project:   {}", report.project_id);
    println!("  Status:    {}", colored_status(report.status));
    if report.artifacts_purged > 0 {
        println!("  Purged:    {} artifacts", report.artifacts_purged);
    }
    println!(
        "  Files:     {} discovered, {} analyzed, {} skipped",
        report.files_discovered, report.files_analyzed, report.files_failed
    );
    println!(
        "  Persisted: {} classes, {} methods in {} chunks",
        report.classes_persisted, report.methods_persisted, report.chunks_committed
    );
    println!("  Duration:  {:.2}s", report.duration_secs);

    for warning in &report.warnings {
        println!("  {} {}: {}", "skipped".yellow(), warning.path, warning.message);
    }

    if let Some(failure) = &report.failure {
        println!(
            "  {} {} ({}): {}",
            "failed".red().bold(),
            failure.step,
            failure.kind,
            failure.message
        );
    }
}
