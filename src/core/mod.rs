//! Core domain models
//!
//! This module defines the context processors share, the processor contract,
//! processing results and the pipeline surface common to every execution mode.

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod result;
pub mod state;

pub use config::{ConfiguredPipeline, PipelineConfig, PipelineKind, ProcessorConfig};
pub use context::Context;
pub use error::{PipelineError, ProcessingError};
pub use pipeline::{Pipeline, ProcessorList};
pub use processor::Processor;
pub use result::{ProcessingResult, ProcessingStatus};
pub use state::{ExecutionOutcome, ExecutionStatus, ProcessorRun};
