//! Processor contract

use crate::core::{Context, ProcessingResult};
use async_trait::async_trait;

/// A single unit of work in a pipeline
///
/// A processor declares at most one key it reads and at most one key it
/// writes, and transforms the context in `process`. Expected failures must be
/// returned as [`ProcessingResult::failed`]; a panic is treated as a defect
/// and aborts the run.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Name recorded in the context history
    fn name(&self) -> &str;

    /// Key this processor reads, if it has a single required input
    fn input_key(&self) -> Option<&str> {
        None
    }

    /// Key this processor writes, if it produces context-visible output
    fn output_key(&self) -> Option<&str> {
        None
    }

    async fn process(&self, context: &mut Context) -> ProcessingResult;
}

impl std::fmt::Debug for dyn Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("name", &self.name())
            .field("input_key", &self.input_key())
            .field("output_key", &self.output_key())
            .finish()
    }
}
