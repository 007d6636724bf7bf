//! Test utility functions for llm-processors
#![allow(dead_code)]

use async_trait::async_trait;
use llm_processors::core::{
    Context, ExecutionOutcome, ExecutionStatus, ProcessingError, ProcessingResult, Processor,
};
use llm_processors::llm::{LlmClient, LlmError, LlmRequest, LlmResponse};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted processor does when invoked
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write the value under the output key and complete
    Write(Value),
    /// Copy the input value to the output key
    Copy,
    /// Return a failed result
    Fail(String),
    /// Panic inside `process`
    Panic(String),
}

/// Processor with declared keys, an optional delay and a call counter
pub struct ScriptedProcessor {
    name: String,
    input: Option<String>,
    output: Option<String>,
    delay: Option<Duration>,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedProcessor {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            input: None,
            output: None,
            delay: None,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reads(mut self, key: &str) -> Self {
        self.input = Some(key.to_string());
        self
    }

    pub fn writes(mut self, key: &str) -> Self {
        self.output = Some(key.to_string());
        self
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `process` calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Sorted context keys observed at the start of each call
    pub fn seen_keys(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        self.seen.clone()
    }

    pub fn shared(self) -> Arc<dyn Processor> {
        Arc::new(self)
    }
}

#[async_trait]
impl Processor for ScriptedProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_key(&self) -> Option<&str> {
        self.input.as_deref()
    }

    fn output_key(&self) -> Option<&str> {
        self.output.as_deref()
    }

    async fn process(&self, context: &mut Context) -> ProcessingResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut keys: Vec<String> = context.keys().cloned().collect();
        keys.sort();
        self.seen.lock().unwrap().push(keys);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let value = match &self.behavior {
            Behavior::Write(value) => value.clone(),
            Behavior::Copy => {
                let key = self.input.as_deref().unwrap_or_default();
                match context.get(key) {
                    Some(value) => value.clone(),
                    None => {
                        return ProcessingResult::failed(ProcessingError::MissingInput {
                            key: key.to_string(),
                        })
                    }
                }
            }
            Behavior::Fail(message) => {
                return ProcessingResult::failed(ProcessingError::Other(message.clone()))
            }
            Behavior::Panic(message) => panic!("{}", message),
        };

        if let Some(key) = &self.output {
            context.set(key.as_str(), value.clone());
        }
        ProcessingResult::completed(value)
    }
}

/// Shorthand for a processor writing `value` to `output`
pub fn writer(name: &str, output: &str, value: Value) -> ScriptedProcessor {
    ScriptedProcessor::new(name, Behavior::Write(value)).writes(output)
}

/// Shorthand for a processor copying `input` to `output`
pub fn copier(name: &str, input: &str, output: &str) -> ScriptedProcessor {
    ScriptedProcessor::new(name, Behavior::Copy).reads(input).writes(output)
}

/// LLM client returning predefined responses in order and recording requests
pub struct MockLlm {
    responses: Vec<String>,
    index: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(str::to_string).collect(),
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Transcript of every request received so far
    pub fn prompts(&self) -> Vec<String> {
        self.requests().iter().map(LlmRequest::transcript).collect()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let idx = self.index.fetch_add(1, Ordering::SeqCst);

        match self.responses.get(idx) {
            Some(response) => Ok(LlmResponse::new(response.as_str(), request.model.as_str())),
            None => Err(LlmError::Internal(format!(
                "MockLlm: No response available for request {}",
                idx + 1
            ))),
        }
    }
}

/// Assert the run completed
pub fn assert_completed(outcome: &ExecutionOutcome) {
    assert_eq!(
        outcome.status,
        ExecutionStatus::Completed,
        "Pipeline should be completed, failed processors: {:?}",
        outcome.failed_processors()
    );
}

/// Assert the processor names recorded in the context history
pub fn assert_history(outcome: &ExecutionOutcome, expected: &[&str]) {
    assert_eq!(
        outcome.context.history(),
        expected,
        "Expected history: {:?}\nActual: {:?}",
        expected,
        outcome.context.history()
    );
}

/// Assert a processor failed and its error mentions `expected_error`
pub fn assert_processor_failed(outcome: &ExecutionOutcome, processor: &str, expected_error: &str) {
    let result = outcome
        .result_for(processor)
        .unwrap_or_else(|| panic!("Processor '{}' not found in outcome", processor));

    let error = result
        .error()
        .unwrap_or_else(|| panic!("Processor '{}' should have failed, but completed", processor))
        .to_string();

    assert!(
        error.contains(expected_error),
        "Processor '{}' error:\n{}\n\ndoes not contain:\n{}",
        processor,
        error,
        expected_error
    );
}

/// Build a context from key/value pairs
pub fn context_of(pairs: &[(&str, Value)]) -> Context {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}
