//! Metrix CLI - Main entry point

use clap::Parser;
use metrix_cli::{commands, Cli, Commands};
use metrix_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Console logs go to stderr; stdout carries command output
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("metrix-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().overlay_env().unwrap_or(log_config);

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli.command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(command: Commands) -> metrix_cli::Result<()> {
    match command {
        Commands::Register { name, description } => {
            commands::project::register(name, description).await
        },
        Commands::Upload {
            project_id,
            archive,
        } => commands::project::upload(project_id, &archive).await,
        Commands::Analyze { project_id } => commands::run::analyze(project_id, false).await,
        Commands::Restart { project_id } => commands::run::analyze(project_id, true).await,
        Commands::Delete { project_id, remove } => commands::run::delete(project_id, remove).await,
        Commands::Status { project_id } => commands::project::status(project_id).await,
        Commands::Artifacts { project_id } => commands::project::artifacts(project_id).await,
        Commands::Inspect { file } => commands::inspect::run(&file),
        Commands::Scan {
            archive,
            chunk_size,
            noc,
            json,
        } => commands::scan::run(&archive, chunk_size, noc, json).await,
        Commands::Migrate => commands::migrate().await,
    }
}
