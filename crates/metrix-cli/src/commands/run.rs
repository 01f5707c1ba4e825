//! `metrix analyze`, `restart` and `delete`
//!
//! Runs are dispatched as background tasks; the CLI waits on the handle so
//! the process outlives the run.

use colored::Colorize;
use uuid::Uuid;

use super::{print_run_report, Session};
use crate::error::Result;

pub async fn analyze(project_id: Uuid, restart: bool) -> Result<()> {
    let session = Session::connect().await?;
    let dispatcher = session.dispatcher();

    let handle = if restart {
        dispatcher.restart_analysis(project_id).await?
    } else {
        dispatcher.start_analysis(project_id).await?
    };

    let report = handle.await??;
    print_run_report(&report);
    Ok(())
}

pub async fn delete(project_id: Uuid, remove: bool) -> Result<()> {
    let session = Session::connect().await?;
    let report = session
        .dispatcher()
        .delete_project(project_id, remove)
        .await?
        .await??;

    let action = if report.project_removed { "Removed" } else { "Deleted" };
    println!("{} project {}", action.green(), project_id);
    println!("  Artifacts removed:  {}", report.artifacts_removed);
    println!("  Workspace entries:  {}", report.workspace_entries_removed);
    for path in &report.workspace_failures {
        println!("  {} {}", "left behind".yellow(), path);
    }
    Ok(())
}
