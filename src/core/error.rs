//! Error types for processors and pipeline runs

use crate::execution::validation::WiringError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Expected failure reported by a processor inside a failed `ProcessingResult`
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ProcessingError {
    #[error("No data found for input key '{key}' in context")]
    MissingInput { key: String },

    #[error("Invalid input at key '{key}': {reason}")]
    InvalidInput { key: String, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Processor {processor} timed out after {after:?}")]
    Timeout { processor: String, after: Duration },

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced to the caller of a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A processor panicked instead of returning a failed result
    #[error("Processor '{processor}' panicked: {message}")]
    ProcessorPanicked { processor: String, message: String },

    /// Wiring validation refused the run
    #[error("Pipeline wiring is invalid: {}", format_wiring_errors(.0))]
    Validation(Vec<WiringError>),

    /// A processor returned a failed result (only produced by `run`)
    #[error("Pipeline execution failed at '{processor}': {error}")]
    ProcessorFailed {
        processor: String,
        error: ProcessingError,
    },
}

fn format_wiring_errors(errors: &[WiringError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
