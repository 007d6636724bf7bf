//! Processor applying a function to one context value

use crate::core::{Context, ProcessingError, ProcessingResult, Processor};
use crate::processors::value_type;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

type TransformFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Reads `input_key`, applies the transform and writes `output_key`
///
/// Without a transform the value is copied unchanged.
#[derive(Clone)]
pub struct DataTransformProcessor {
    name: String,
    input_key: String,
    output_key: String,
    transform: TransformFn,
}

impl DataTransformProcessor {
    pub fn new(input_key: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            name: "DataTransformProcessor".to_string(),
            input_key: input_key.into(),
            output_key: output_key.into(),
            transform: Arc::new(|value| Ok(value.clone())),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }
}

impl std::fmt::Debug for DataTransformProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTransformProcessor")
            .field("name", &self.name)
            .field("input_key", &self.input_key)
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Processor for DataTransformProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_key(&self) -> Option<&str> {
        Some(&self.input_key)
    }

    fn output_key(&self) -> Option<&str> {
        Some(&self.output_key)
    }

    async fn process(&self, context: &mut Context) -> ProcessingResult {
        let input = match context.get(&self.input_key) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                return ProcessingResult::failed(ProcessingError::MissingInput {
                    key: self.input_key.clone(),
                })
            }
        };

        let output = match (self.transform)(&input) {
            Ok(output) => output,
            Err(reason) => return ProcessingResult::failed(ProcessingError::Transform(reason)),
        };

        let input_type = value_type(&input);
        let output_type = value_type(&output);
        context.set(self.output_key.as_str(), output.clone());

        ProcessingResult::completed(output)
            .with_metadata("processor_type", "data_transform")
            .with_metadata("input_key", self.input_key.as_str())
            .with_metadata("output_key", self.output_key.as_str())
            .with_metadata("input_type", input_type)
            .with_metadata("output_type", output_type)
    }
}
