//! Analysis runs: ordered steps, chunked persistence, status lifecycle.

pub mod chunk;
pub mod dispatcher;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod source;
pub mod status;
pub mod steps;

pub use chunk::{ChunkStats, ChunkWriter};
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use jobs::{AnalysisJob, DeleteReport, FileWarning, RunKind, RunReport, StepFailure};
pub use orchestrator::Orchestrator;
pub use source::SourceFileSet;
pub use status::{check_claim, StatusTracker};
pub use steps::{Pipeline, Step, StepKind};
