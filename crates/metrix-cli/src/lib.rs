//! Metrix CLI Library
//!
//! Command-line front end for the Metrix analysis pipeline.
//!
//! - **Projects**: register and inspect projects (`metrix register`, `metrix status`)
//! - **Archives**: upload a ZIP of sources (`metrix upload`)
//! - **Runs**: trigger analysis, restart, delete (`metrix analyze|restart|delete`)
//! - **Results**: dump stored artifacts as JSON (`metrix artifacts`)
//! - **Offline**: measure a single file or a whole archive without a database
//!   (`metrix inspect`, `metrix scan`)

pub mod commands;
pub mod error;

pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Metrix - source metrics for Java projects
#[derive(Parser, Debug)]
#[command(name = "metrix")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new project
    Register {
        /// Project name
        name: String,

        /// Project description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Store a ZIP archive as the project's sources
    Upload {
        project_id: Uuid,

        /// Path to the ZIP archive
        archive: PathBuf,
    },

    /// Run the first analysis of a newly uploaded project and wait for it
    Analyze { project_id: Uuid },

    /// Purge previous results and analyze again
    Restart { project_id: Uuid },

    /// Delete a project's artifacts and workspace
    Delete {
        project_id: Uuid,

        /// Also drop the project registration
        #[arg(long)]
        remove: bool,
    },

    /// Show one project, or every project when no id is given
    Status { project_id: Option<Uuid> },

    /// Print a project's stored artifacts as JSON
    Artifacts { project_id: Uuid },

    /// Measure one source file and print the metrics as JSON
    Inspect {
        /// Source file to analyze
        file: PathBuf,
    },

    /// Run the whole pipeline on an archive without a database
    Scan {
        /// Path to the ZIP archive
        archive: PathBuf,

        /// Artifacts per committed chunk
        #[arg(long, env = "METRIX_CHUNK_SIZE", default_value_t = metrix_core::config::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Fill in number-of-children from a whole-project pass
        #[arg(long)]
        noc: bool,

        /// Print artifacts as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Apply database migrations
    Migrate,
}
