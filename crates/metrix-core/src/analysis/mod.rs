//! Metrics engine
//!
//! Parses one source file at a time into a [`model::SourceModel`] and derives
//! class and method metrics from it:
//!
//! | metric | definition |
//! |--------|-----------|
//! | lines of code | end line - start line + 1 of the declaration |
//! | numberAttributes | field declarations directly in the type |
//! | CBO | distinct type names referenced in the declaration, itself excluded |
//! | DIT | 1 with an explicit superclass, else 0 |
//! | NOC | in-degree in a project [`TypeGraph`], 0 without one |
//! | cyclomatic complexity | 1 + if/for/for-each/while/do/case label/catch/ternary |
//!
//! Analysis of one file never depends on another, so batches are parsed on
//! the rayon pool. A file that does not parse yields an [`AnalysisError`]
//! for that file only.

pub mod complexity;
pub mod coupling;
pub mod hierarchy;
pub mod metrics;
pub mod model;
pub mod parser;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use hierarchy::TypeGraph;
pub use metrics::{ClassReport, FileMetrics, MethodReport};
pub use model::SourceModel;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read source file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Syntax error near line {line}")]
    Syntax { line: usize },

    #[error("Parser gave up before producing a tree")]
    Aborted,

    #[error("Grammar could not be loaded: {0}")]
    Grammar(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Outcome for one file of a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub relative: String,
    pub result: AnalysisResult<FileMetrics>,
}

fn read_source(path: &Path) -> AnalysisResult<String> {
    let bytes = std::fs::read(path)?;
    // Legacy sources are often Latin-1; replacement characters only ever land
    // inside literals and comments, which the metrics ignore
    Ok(String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// `path` relative to `root`, with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a file into its structural model.
pub fn parse_file(path: &Path) -> AnalysisResult<SourceModel> {
    parser::parse_source(&read_source(path)?)
}

/// Analyze one file. `root` only shapes the recorded relative path.
pub fn analyze_file(root: &Path, path: &Path, graph: Option<&TypeGraph>) -> AnalysisResult<FileMetrics> {
    let model = parse_file(path)?;
    Ok(FileMetrics::from_model(relative_path(root, path), model, graph))
}

/// Analyze a batch in parallel. Outcomes keep the order of `paths`.
pub fn analyze_batch(root: &Path, paths: &[PathBuf], graph: Option<&TypeGraph>) -> Vec<FileOutcome> {
    paths
        .par_iter()
        .map(|path| FileOutcome {
            path: path.clone(),
            relative: relative_path(root, path),
            result: analyze_file(root, path, graph),
        })
        .collect()
}

/// First pass for NOC: superclass edges of every parseable file.
///
/// Files that fail to parse are left out of the graph; the analysis pass
/// reports them.
pub fn build_type_graph(paths: &[PathBuf]) -> TypeGraph {
    paths
        .par_iter()
        .filter_map(|path| parse_file(path).ok())
        .map(|model| {
            let mut graph = TypeGraph::new();
            graph.add_model(&model);
            graph
        })
        .reduce(TypeGraph::new, TypeGraph::merge)
}
