//! Pipeline domain model

use crate::{
    core::{Context, ExecutionOutcome, PipelineError, Processor},
    execution::{executor::ProcessorExecutor, validation::WiringError, ExecutionEvent},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The ordered processors of a pipeline plus its wiring assumptions
#[derive(Debug)]
pub struct ProcessorList {
    /// Pipeline name
    pub name: String,

    /// Processors in insertion order
    processors: Vec<Arc<dyn Processor>>,

    /// Keys assumed present before the first processor runs
    seed_keys: HashSet<String>,

    /// Set by a clean validation, cleared by any change to the list
    validated: AtomicBool,
}

impl ProcessorList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            processors: Vec::new(),
            seed_keys: HashSet::new(),
            validated: AtomicBool::new(false),
        }
    }

    pub fn processors(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    pub fn seed_keys(&self) -> &HashSet<String> {
        &self.seed_keys
    }

    pub fn push(&mut self, processor: Arc<dyn Processor>) {
        self.processors.push(processor);
        self.invalidate();
    }

    pub fn extend<I: IntoIterator<Item = Arc<dyn Processor>>>(&mut self, processors: I) {
        self.processors.extend(processors);
        self.invalidate();
    }

    /// Remove the first processor with this name
    pub fn remove(&mut self, name: &str) -> bool {
        match self.processors.iter().position(|p| p.name() == name) {
            Some(index) => {
                self.processors.remove(index);
                self.invalidate();
                true
            }
            None => false,
        }
    }

    pub fn add_seed_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.seed_keys.extend(keys.into_iter().map(Into::into));
        self.invalidate();
    }

    pub fn is_validated(&self) -> bool {
        self.validated.load(Ordering::SeqCst)
    }

    fn mark_validated(&self, clean: bool) {
        self.validated.store(clean, Ordering::SeqCst);
    }

    fn invalidate(&mut self) {
        *self.validated.get_mut() = false;
    }
}

/// Common surface of sequential and parallel pipelines
///
/// Implementors supply their processor list, their executor, the wiring rule
/// for their execution mode and `execute`; building, validation bookkeeping
/// and the convenience runners are shared.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn processor_list(&self) -> &ProcessorList;

    fn processor_list_mut(&mut self) -> &mut ProcessorList;

    fn executor_mut(&mut self) -> &mut ProcessorExecutor;

    /// Wiring errors given the keys available before the pipeline starts
    fn check_wiring(&self, available: &HashSet<String>) -> Vec<WiringError>;

    /// Run every processor over `context` and return the outcome.
    ///
    /// Does not validate; see [`Pipeline::execute_validated`].
    async fn execute(&self, context: Context) -> Result<ExecutionOutcome, PipelineError>;

    fn name(&self) -> &str {
        &self.processor_list().name
    }

    fn processors(&self) -> &[Arc<dyn Processor>] {
        self.processor_list().processors()
    }

    fn len(&self) -> usize {
        self.processors().len()
    }

    fn is_empty(&self) -> bool {
        self.processors().is_empty()
    }

    /// Append a processor
    fn add_processor(&mut self, processor: Arc<dyn Processor>) -> &mut Self
    where
        Self: Sized,
    {
        self.processor_list_mut().push(processor);
        self
    }

    /// Append several processors, keeping their order
    fn add_processors<I>(&mut self, processors: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Processor>>,
        Self: Sized,
    {
        self.processor_list_mut().extend(processors);
        self
    }

    /// Remove a processor by name
    fn remove_processor(&mut self, name: &str) -> bool {
        self.processor_list_mut().remove(name)
    }

    /// Declare keys that will be present in the initial context
    fn add_seed_keys<I, K>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        Self: Sized,
    {
        self.processor_list_mut().add_seed_keys(keys);
        self
    }

    /// Timeout applied to every processor without its own
    fn set_default_timeout(&mut self, limit: Option<Duration>) -> &mut Self
    where
        Self: Sized,
    {
        self.executor_mut().set_default_timeout(limit);
        self
    }

    /// Timeout for one processor, by name
    fn set_processor_timeout(&mut self, processor: &str, limit: Duration) -> &mut Self
    where
        Self: Sized,
    {
        self.executor_mut().set_processor_timeout(processor, limit);
        self
    }

    fn add_event_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
        Self: Sized,
    {
        self.executor_mut().add_event_handler(handler);
        self
    }

    /// Validate wiring against the seed keys. Never fails; reports.
    fn validate_pipeline(&self) -> Vec<WiringError> {
        let list = self.processor_list();
        let errors = self.check_wiring(list.seed_keys());
        list.mark_validated(errors.is_empty());
        errors
    }

    /// True when the last validation was clean and nothing changed since
    fn is_validated(&self) -> bool {
        self.processor_list().is_validated()
    }

    /// Validate against the seed keys plus the keys of `context`, then run.
    ///
    /// Refuses with [`PipelineError::Validation`] when wiring errors exist.
    async fn execute_validated(&self, context: Context) -> Result<ExecutionOutcome, PipelineError> {
        let mut available = self.processor_list().seed_keys().clone();
        available.extend(context.keys().cloned());

        let errors = self.check_wiring(&available);
        if !errors.is_empty() {
            return Err(PipelineError::Validation(errors));
        }

        self.execute(context).await
    }

    /// Run with a fresh context built from `initial_data` and return it.
    ///
    /// A failed processor becomes [`PipelineError::ProcessorFailed`].
    async fn run(&self, initial_data: HashMap<String, Value>) -> Result<Context, PipelineError> {
        let outcome = self.execute(Context::with_data(initial_data)).await?;

        if let Some(failed) = outcome.first_failure() {
            let error = failed.result.error().cloned().unwrap_or_else(|| {
                crate::core::ProcessingError::Other("unknown failure".to_string())
            });
            return Err(PipelineError::ProcessorFailed {
                processor: failed.processor.clone(),
                error,
            });
        }

        Ok(outcome.context)
    }
}
