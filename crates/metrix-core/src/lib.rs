//! Metrix Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Ingests a project's ZIP archive, measures every Java source file in it and
//! stores the resulting class and method metrics.
//!
//! # Overview
//!
//! - **Workspace**: one directory per project holding the uploaded archive
//!   and its extracted sources ([`workspace`])
//! - **Archive**: extraction with a path-traversal guard ([`archive`])
//! - **Analysis**: tree-sitter based metrics engine ([`analysis`])
//! - **Pipeline**: ordered steps, chunked persistence and the project status
//!   lifecycle ([`pipeline`])
//! - **Persistence**: store traits with Postgres and in-memory backends
//!   ([`store`], [`db`])
//!
//! # Status lifecycle
//!
//! ```text
//! ADDED ──> PROCESSING_FILES ──> FINISHED
//!                 ^    └───────> ERROR
//!                 └── restart from FINISHED or ERROR
//! ```
//!
//! # Example
//!
//! ```no_run
//! use metrix_core::{config::Config, db, pipeline::{Dispatcher, Orchestrator}, workspace::Workspace};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let store = Arc::new(db::PgStore::new(pool));
//!     let orchestrator =
//!         Orchestrator::new(store, Workspace::new(&config.workspace.base_dir), config.pipeline);
//!     let dispatcher = Dispatcher::new(orchestrator);
//!     let run = dispatcher.start_analysis(uuid::Uuid::nil()).await?;
//!     let report = run.await??;
//!     println!("{:?}", report.status);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod archive;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use pipeline::{Dispatcher, Orchestrator, PipelineError};
