//! Parallel pipeline - processors run concurrently, results merged at the join

use crate::{
    core::{
        Context, ExecutionOutcome, ExecutionStatus, Pipeline, PipelineError, Processor,
        ProcessorList, ProcessorRun,
    },
    execution::{executor::ProcessorExecutor, validation, ExecutionEvent, WiringError},
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline that executes processors concurrently
///
/// Every branch starts from the context as it was when the group started and
/// runs on the caller's task, so branches interleave only where a processor
/// awaits. At the join point each branch's writes are merged back in
/// insertion order and the branch names are appended to the history in the
/// same order. A failed branch does not affect its siblings; a panicking
/// branch cancels the rest of the group.
#[derive(Debug)]
pub struct ParallelPipeline {
    processors: ProcessorList,
    executor: ProcessorExecutor,
}

impl ParallelPipeline {
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

impl Default for ParallelPipeline {
    fn default() -> Self {
        Self::new("ParallelPipeline")
    }
}

#[async_trait]
impl Pipeline for ParallelPipeline {
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
        validation::validate_parallel(self.processors.processors(), available)
    }

    async fn execute(&self, mut context: Context) -> Result<ExecutionOutcome, PipelineError> {
        let name = self.name();
        let run_id = context.run_id;
        info!(
            "Starting parallel execution: {} ({}) with {} branches",
            name,
            run_id,
            self.len()
        );
        self.executor.emit(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: name.to_string(),
            processor_count: self.len(),
            at: chrono::Utc::now(),
        });

        let mut forks: Vec<Context> = self.processors().iter().map(|_| context.fork()).collect();

        let branches = self
            .processors()
            .iter()
            .zip(forks.iter_mut())
            .map(|(processor, fork)| self.executor.invoke(processor.as_ref(), fork));

        // Short-circuits on the first panic and drops the unfinished branches
        let results = try_join_all(branches).await?;

        let mut runs = Vec::with_capacity(results.len());
        for ((processor, fork), result) in self.processors().iter().zip(forks).zip(results) {
            debug!("Merging branch {} into context", processor.name());
            context.merge(fork);
            context.record(processor.name());
            runs.push(ProcessorRun {
                processor: processor.name().to_string(),
                result,
            });
        }

        let status = if runs.iter().all(|run| run.result.is_completed()) {
            ExecutionStatus::Completed
        } else {
            let failed = runs.iter().filter(|run| run.result.is_failed()).count();
            warn!("Parallel pipeline {}: {} of {} branches failed", name, failed, runs.len());
            ExecutionStatus::PartiallyFailed
        };

        info!("Pipeline execution finished: {} - {:?}", name, status);
        self.executor.emit(ExecutionEvent::PipelineCompleted {
            run_id,
            status,
            at: chrono::Utc::now(),
        });

        Ok(ExecutionOutcome {
            status,
            results: runs,
            context,
        })
    }
}
