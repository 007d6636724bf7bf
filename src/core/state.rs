//! Execution state models

use crate::core::{Context, ProcessingResult};
use serde::{Deserialize, Serialize};

/// Aggregate status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Every processor that ran completed
    Completed,
    /// A sequential run stopped at a failed processor
    Failed,
    /// Some parallel branches failed; every branch result is still present
    PartiallyFailed,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Completed)
    }
}

/// Result of one processor within a run, tagged with its name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorRun {
    pub processor: String,
    pub result: ProcessingResult,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,

    /// Per-processor results in insertion order
    pub results: Vec<ProcessorRun>,

    /// Final context
    pub context: Context,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Result for a processor by name
    pub fn result_for(&self, processor: &str) -> Option<&ProcessingResult> {
        self.results
            .iter()
            .find(|run| run.processor == processor)
            .map(|run| &run.result)
    }

    /// The first failed run, if any
    pub fn first_failure(&self) -> Option<&ProcessorRun> {
        self.results.iter().find(|run| run.result.is_failed())
    }

    /// Names of failed processors, in insertion order
    pub fn failed_processors(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|run| run.result.is_failed())
            .map(|run| run.processor.as_str())
            .collect()
    }
}
