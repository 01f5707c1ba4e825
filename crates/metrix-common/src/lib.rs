//! Metrix Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging bootstrap, and error handling for the Metrix workspace.
//!
//! - **Error Handling**: [`MetrixError`] and the [`Result`] alias
//! - **Types**: the project lifecycle status and artifact kind enums that are
//!   persisted as text and shared between the pipeline and its callers
//! - **Logging**: `tracing-subscriber` setup driven by `LOG_*` variables
//!
//! # Example
//!
//! ```no_run
//! use metrix_common::types::ProjectStatus;
//!
//! let status: ProjectStatus = "processing_files".parse().unwrap();
//! assert!(status.is_running());
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{MetrixError, Result};
