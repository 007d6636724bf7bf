//! Events emitted while a pipeline runs

use crate::core::ExecutionStatus;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        processor_count: usize,
        at: DateTime<Utc>,
    },
    ProcessorStarted {
        processor: String,
    },
    ProcessorCompleted {
        processor: String,
        elapsed_ms: u64,
    },
    ProcessorFailed {
        processor: String,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: ExecutionStatus,
        at: DateTime<Utc>,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;
