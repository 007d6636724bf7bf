//! llm-processors - composable processors for LLM workflows, run in
//! sequential or parallel pipelines over a shared context

pub mod cli;
pub mod core;
pub mod execution;
pub mod llm;
pub mod processors;

// Re-export commonly used types
pub use core::{
    Context, ExecutionOutcome, ExecutionStatus, Pipeline, PipelineConfig, PipelineError,
    ProcessingError, ProcessingResult, ProcessingStatus, Processor,
};
pub use execution::{ExecutionEvent, ParallelPipeline, SequentialPipeline, WiringError};
pub use llm::{ChatMessage, EchoClient, LlmClient, LlmRequest, LlmResponse};
pub use processors::{DataTransformProcessor, LlmProcessor, NoOpProcessor, PromptProcessor};
