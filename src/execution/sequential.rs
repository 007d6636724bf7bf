//! Sequential pipeline - processors run one at a time, in order

use crate::{
    core::{
        Context, ExecutionOutcome, ExecutionStatus, Pipeline, PipelineError, Processor,
        ProcessorList, ProcessorRun,
    },
    execution::{executor::ProcessorExecutor, validation, ExecutionEvent, WiringError},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline that executes processors in sequence
///
/// Stops at the first processor that returns a failed result; nothing after
/// it runs.
#[derive(Debug)]
pub struct SequentialPipeline {
    processors: ProcessorList,
    executor: ProcessorExecutor,
}

impl SequentialPipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            processors: ProcessorList::new(name),
            executor: ProcessorExecutor::new(),
        }
    }

    /// Create a pipeline pre-populated with processors
    pub fn with_processors<I>(name: impl Into<String>, processors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Processor>>,
    {
        let mut pipeline = Self::new(name);
        pipeline.processors.extend(processors);
        pipeline
    }

    /// Builder-style append
    pub fn with_processor<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }
}

impl Default for SequentialPipeline {
    fn default() -> Self {
        Self::new("SequentialPipeline")
    }
}

#[async_trait]
impl Pipeline for SequentialPipeline {
    fn processor_list(&self) -> &ProcessorList {
        &self.processors
    }

    fn processor_list_mut(&mut self) -> &mut ProcessorList {
        &mut self.processors
    }

    fn executor_mut(&mut self) -> &mut ProcessorExecutor {
        &mut self.executor
    }

    fn check_wiring(&self, available: &HashSet<String>) -> Vec<WiringError> {
        validation::validate_sequence(self.processors.processors(), available)
    }

    async fn execute(&self, mut context: Context) -> Result<ExecutionOutcome, PipelineError> {
        let name = self.name();
        let run_id = context.run_id;
        info!("Starting pipeline execution: {} ({})", name, run_id);
        self.executor.emit(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: name.to_string(),
            processor_count: self.len(),
            at: chrono::Utc::now(),
        });

        let mut results = Vec::with_capacity(self.len());
        let mut status = ExecutionStatus::Completed;

        for processor in self.processors() {
            let result = self.executor.invoke(processor.as_ref(), &mut context).await?;
            context.record(processor.name());

            let failed = result.is_failed();
            results.push(ProcessorRun {
                processor: processor.name().to_string(),
                result,
            });

            if failed {
                warn!("Pipeline {} stopped at failed processor {}", name, processor.name());
                status = ExecutionStatus::Failed;
                break;
            }
        }

        info!("Pipeline execution finished: {} - {:?}", name, status);
        self.executor.emit(ExecutionEvent::PipelineCompleted {
            run_id,
            status,
            at: chrono::Utc::now(),
        });

        Ok(ExecutionOutcome {
            status,
            results,
            context,
        })
    }
}
