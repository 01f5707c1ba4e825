//! `metrix register`, `upload`, `status` and `artifacts`

use colored::Colorize;
use metrix_core::models::{NewProject, Project};
use metrix_core::store::{ArtifactStore, ProjectStore};
use std::path::Path;
use uuid::Uuid;

use super::{colored_status, Session};
use crate::error::{CliError, Result};

pub async fn register(name: String, description: String) -> Result<()> {
    let session = Session::connect().await?;
    let project = session
        .store
        .create_project(NewProject::new(name).with_description(description))
        .await?;

    println!("{} {}", "Registered".green(), project.id);
    Ok(())
}

/// Read `archive` and store it as the project's upload.
pub async fn upload(project_id: Uuid, archive: &Path) -> Result<()> {
    let session = Session::connect().await?;
    session.store.get_project(project_id).await?;

    let bytes = read_archive(archive)?;
    let stored = session.workspace().store_archive(project_id, &bytes)?;

    println!("{} {} bytes to {}", "Uploaded".green(), bytes.len(), stored.display());
    Ok(())
}

pub(crate) fn read_archive(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound(path.display().to_string()),
        _ => CliError::Io(e),
    })
}

pub async fn status(project_id: Option<Uuid>) -> Result<()> {
    let session = Session::connect().await?;

    let projects = match project_id {
        Some(id) => vec![session.store.get_project(id).await?],
        None => session.store.list_projects().await?,
    };

    if projects.is_empty() {
        println!("No projects registered.");
        println!("Run 'metrix register <name>' to add one.");
        return Ok(());
    }

    for project in &projects {
        let counts = session.store.count_artifacts(project.id).await?;
        print_project(project);
        println!("  Artifacts: {} classes, {} methods", counts.classes, counts.methods);
        println!();
    }

    Ok(())
}

fn print_project(project: &Project) {
    println!("{} {}", project.name.bold(), project.id.to_string().dimmed());
    if !project.description.is_empty() {
        println!("  {}", project.description);
    }
    println!("  Status:    {}", colored_status(project.status));
    println!("  Updated:   {}", project.updated_at);
}

pub async fn artifacts(project_id: Uuid) -> Result<()> {
    let session = Session::connect().await?;
    session.store.get_project(project_id).await?;

    let artifacts = session.store.list_artifacts(project_id).await?;
    println!("{}", serde_json::to_string_pretty(&artifacts)?);
    Ok(())
}
