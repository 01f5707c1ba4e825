//! `metrix scan` command implementation
//!
//! Runs the full pipeline against an in-memory store inside a temporary
//! workspace, so an archive can be measured without a database.

use colored::Colorize;
use metrix_core::config::PipelineConfig;
use metrix_core::models::{Artifact, NewProject};
use metrix_core::pipeline::{AnalysisJob, Orchestrator, RunReport};
use metrix_core::store::{ArtifactStore, MemoryStore, ProjectStore};
use metrix_core::workspace::Workspace;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use super::print_run_report;
use super::project::read_archive;
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub report: RunReport,
    pub artifacts: Vec<Artifact>,
}

pub async fn scan_archive(archive: &Path, config: PipelineConfig) -> Result<ScanOutcome> {
    config.validate()?;
    let bytes = read_archive(archive)?;

    let scratch = tempfile::TempDir::new()?;
    let store = Arc::new(MemoryStore::new());
    let name = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan".to_string());
    let project = store.create_project(NewProject::new(name)).await?;

    let orchestrator = Orchestrator::new(Arc::clone(&store), Workspace::new(scratch.path()), config);
    orchestrator.workspace().store_archive(project.id, &bytes)?;

    let report = orchestrator.run(AnalysisJob::fresh(project.id)).await?;
    let artifacts = store.list_artifacts(project.id).await?;

    Ok(ScanOutcome { report, artifacts })
}

pub async fn run(archive: &Path, chunk_size: usize, noc: bool, json: bool) -> Result<()> {
    let config = PipelineConfig::default()
        .with_chunk_size(chunk_size)
        .with_compute_noc(noc);
    let outcome = scan_archive(archive, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_run_report(&outcome.report);
    println!();
    for artifact in &outcome.artifacts {
        match (artifact.as_class(), artifact.as_method()) {
            (Some(class), _) => println!(
                "{} {} loc={} attrs={} methods={} cbo={} dit={} noc={}",
                "class".cyan(),
                artifact.name.bold(),
                artifact.lines_of_code,
                class.number_attributes,
                class.number_methods,
                class.cbo,
                class.dit,
                class.noc
            ),
            (None, Some(method)) => println!(
                "  {} {} loc={} params={} cc={}",
                "method".blue(),
                artifact.name,
                artifact.lines_of_code,
                method.parameter_count,
                method.cyclomatic_complexity
            ),
            (None, None) => {},
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrix_common::types::ProjectStatus;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_scan_archive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let archive = tmp.path().join("shapes.zip");
        write_zip(
            &archive,
            &[
                ("Shape.java", "abstract class Shape { abstract double area(); }"),
                ("Square.java", "class Square extends Shape { double s; double area() { return s * s; } }"),
            ],
        );

        let config = PipelineConfig::default().with_compute_noc(true);
        let outcome = scan_archive(&archive, config).await.unwrap();

        assert_eq!(outcome.report.status, ProjectStatus::Finished);
        let shape = outcome.artifacts.iter().find(|a| a.name == "Shape").unwrap();
        assert_eq!(shape.as_class().unwrap().noc, 1);
        assert_eq!(outcome.artifacts.len(), 4);
    }

    #[tokio::test]
    async fn test_scan_rejects_zero_chunk_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let archive = tmp.path().join("a.zip");
        write_zip(&archive, &[("A.java", "class A {}")]);

        let config = PipelineConfig::default().with_chunk_size(0);
        assert!(scan_archive(&archive, config).await.is_err());
    }
}
