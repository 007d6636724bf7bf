//! Processor that does nothing, optionally copying one key to another

use crate::core::{Context, ProcessingResult, Processor};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Always completes; useful for testing and debugging pipelines
#[derive(Debug, Clone)]
pub struct NoOpProcessor {
    name: String,
    input_key: Option<String>,
    output_key: Option<String>,
    passthrough: bool,
    metadata: HashMap<String, Value>,
}

impl NoOpProcessor {
    pub fn new() -> Self {
        Self {
            name: "NoOpProcessor".to_string(),
            input_key: None,
            output_key: None,
            passthrough: false,
            metadata: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Copy the input value to the output key when both keys are set
    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Static metadata merged into every result
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for NoOpProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for NoOpProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_key(&self) -> Option<&str> {
        self.input_key.as_deref()
    }

    fn output_key(&self) -> Option<&str> {
        self.output_key.as_deref()
    }

    async fn process(&self, context: &mut Context) -> ProcessingResult {
        if self.passthrough {
            if let (Some(input), Some(output)) = (&self.input_key, &self.output_key) {
                if let Some(value) = context.get(input).cloned() {
                    debug!("{}: copying '{}' to '{}'", self.name, input, output);
                    context.set(output.as_str(), value);
                }
            }
        }

        let mut context_keys: Vec<&String> = context.keys().collect();
        context_keys.sort();

        ProcessingResult::completed(Value::Null)
            .with_metadata("processor_type", "noop")
            .with_metadata("context_keys", json!(context_keys))
            .with_metadata("input_key", json!(self.input_key))
            .with_metadata("output_key", json!(self.output_key))
            .with_metadata("passthrough", self.passthrough)
            .with_metadata_map(self.metadata.clone())
    }
}
