//! Ordered step lists for each run kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::jobs::RunKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Claim the project: status becomes `ProcessingFiles`
    Start,
    /// Restart only: drop artifacts of the previous run
    PurgeArtifacts,
    Extract,
    AnalyzeAndPersist,
    /// Status becomes `Finished`
    Finish,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Start => "start",
            StepKind::PurgeArtifacts => "purge_artifacts",
            StepKind::Extract => "extract",
            StepKind::AnalyzeAndPersist => "analyze_and_persist",
            StepKind::Finish => "finish",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// Whether a failure moves the project to `Error`. Only the start step
    /// opts out: when it fails the run never owned the project.
    pub marks_error: bool,
}

impl Step {
    fn guarded(kind: StepKind) -> Self {
        Self {
            kind,
            marks_error: true,
        }
    }
}

/// Steps of one run, executed strictly in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    run_kind: RunKind,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn for_run(run_kind: RunKind) -> Self {
        let mut steps = vec![Step {
            kind: StepKind::Start,
            marks_error: false,
        }];
        if run_kind == RunKind::Restart {
            steps.push(Step::guarded(StepKind::PurgeArtifacts));
        }
        steps.extend(
            [StepKind::Extract, StepKind::AnalyzeAndPersist, StepKind::Finish]
                .into_iter()
                .map(Step::guarded),
        );

        Self { run_kind, steps }
    }

    pub fn run_kind(&self) -> RunKind {
        self.run_kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}
