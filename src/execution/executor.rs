//! Processor executor - runs individual processors for a pipeline

use crate::{
    core::{Context, PipelineError, ProcessingError, ProcessingResult, Processor},
    execution::events::{EventHandler, ExecutionEvent},
};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Invokes processors on behalf of a pipeline
///
/// Owns the per-processor timeouts and the event handlers. A panic raised
/// inside `process` is caught here and turned into
/// [`PipelineError::ProcessorPanicked`]; everything else a processor reports
/// is passed through as data.
#[derive(Clone, Default)]
pub struct ProcessorExecutor {
    default_timeout: Option<Duration>,
    timeouts: HashMap<String, Duration>,
    handlers: Vec<EventHandler>,
}

impl ProcessorExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout applied to processors without their own
    pub fn set_default_timeout(&mut self, limit: Option<Duration>) {
        self.default_timeout = limit;
    }

    /// Timeout for one processor, by name
    pub fn set_processor_timeout(&mut self, processor: impl Into<String>, limit: Duration) {
        self.timeouts.insert(processor.into(), limit);
    }

    pub fn timeout_for(&self, processor: &str) -> Option<Duration> {
        self.timeouts.get(processor).copied().or(self.default_timeout)
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.handlers.push(std::sync::Arc::new(handler));
    }

    /// Emit an event to all handlers
    pub fn emit(&self, event: ExecutionEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }

    /// Run one processor against `context` and time it
    pub async fn invoke(
        &self,
        processor: &dyn Processor,
        context: &mut Context,
    ) -> Result<ProcessingResult, PipelineError> {
        let name = processor.name();
        info!("Executing processor: {}", name);
        self.emit(ExecutionEvent::ProcessorStarted {
            processor: name.to_string(),
        });

        let started = Instant::now();
        let call = AssertUnwindSafe(self.process_with_timeout(processor, context)).catch_unwind();
        let mut result = match call.await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Processor {} panicked: {}", name, message);
                return Err(PipelineError::ProcessorPanicked {
                    processor: name.to_string(),
                    message,
                });
            }
        };

        let elapsed = started.elapsed();
        result.set_execution_time(elapsed);

        match result.error() {
            None => {
                debug!("Processor {} completed in {:?}", name, elapsed);
                self.emit(ExecutionEvent::ProcessorCompleted {
                    processor: name.to_string(),
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
            Some(e) => {
                warn!("Processor {} failed: {}", name, e);
                self.emit(ExecutionEvent::ProcessorFailed {
                    processor: name.to_string(),
                    error: e.to_string(),
                });
            }
        }

        Ok(result)
    }

    async fn process_with_timeout(
        &self,
        processor: &dyn Processor,
        context: &mut Context,
    ) -> ProcessingResult {
        let Some(limit) = self.timeout_for(processor.name()) else {
            return processor.process(context).await;
        };

        match timeout(limit, processor.process(context)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Timeout for processor {} after {:?}", processor.name(), limit);
                ProcessingResult::failed(ProcessingError::Timeout {
                    processor: processor.name().to_string(),
                    after: limit,
                })
            }
        }
    }
}

impl std::fmt::Debug for ProcessorExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorExecutor")
            .field("default_timeout", &self.default_timeout)
            .field("timeouts", &self.timeouts)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
