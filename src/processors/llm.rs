//! Processor sending a conversation to an LLM client

use crate::core::{Context, ProcessingError, ProcessingResult, Processor};
use crate::llm::{ChatMessage, LlmClient, LlmRequest};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads a prompt or conversation, asks the client for a completion and
/// stores the text
///
/// The input may be a string (sent as one user message), an array of
/// `{role, content}` messages, or an object with such an array under
/// `messages`. Any other value is sent as its JSON text. Defaults to reading
/// `prompt` and writing `llm_response`.
#[derive(Clone)]
pub struct LlmProcessor {
    name: String,
    model: String,
    input_key: String,
    output_key: String,
    system_message: Option<String>,
    temperature: f64,
    max_tokens: Option<u32>,
    client: Arc<dyn LlmClient>,
}

impl LlmProcessor {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            name: "LlmProcessor".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            input_key: "prompt".to_string(),
            output_key: "llm_response".to_string(),
            system_message: None,
            temperature: 0.6,
            max_tokens: None,
            client,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = key.into();
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    /// Message sent ahead of the conversation
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Build the request for the value found at the input key
    pub fn prepare_request(&self, input: Option<&Value>) -> Result<LlmRequest, ProcessingError> {
        let messages = match input {
            Some(Value::String(s)) if !s.trim().is_empty() => vec![ChatMessage::user(s.as_str())],
            Some(Value::Null) | Some(Value::String(_)) | None => {
                return Err(ProcessingError::MissingInput {
                    key: self.input_key.clone(),
                })
            }
            Some(Value::Array(items)) => self.parse_messages(items)?,
            Some(Value::Object(object)) => match object.get("messages") {
                Some(Value::Array(items)) => self.parse_messages(items)?,
                Some(_) => {
                    return Err(ProcessingError::InvalidInput {
                        key: self.input_key.clone(),
                        reason: "'messages' must be an array".to_string(),
                    })
                }
                None => vec![ChatMessage::user(Value::Object(object.clone()).to_string())],
            },
            Some(other) => vec![ChatMessage::user(other.to_string())],
        };

        let mut request = LlmRequest::new(self.model.as_str())
            .with_messages(messages)
            .with_temperature(self.temperature);
        if let Some(system_message) = &self.system_message {
            request = request.with_system_message(system_message.as_str());
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        Ok(request)
    }

    fn parse_messages(&self, items: &[Value]) -> Result<Vec<ChatMessage>, ProcessingError> {
        if items.is_empty() {
            return Err(ProcessingError::InvalidInput {
                key: self.input_key.clone(),
                reason: "message list is empty".to_string(),
            });
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value(item.clone()).map_err(|e| ProcessingError::InvalidInput {
                    key: self.input_key.clone(),
                    reason: format!("message {} is not a {{role, content}} object: {}", i, e),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for LlmProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProcessor")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("input_key", &self.input_key)
            .field("output_key", &self.output_key)
            .field("system_message", &self.system_message)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Processor for LlmProcessor {
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
        let request = match self.prepare_request(context.get(&self.input_key)) {
            Ok(request) => request,
            Err(e) => return ProcessingResult::failed(e),
        };

        debug!(
            "{}: sending {} messages to {}",
            self.name,
            request.messages.len(),
            self.model
        );
        let response = match self.client.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{}: completion failed: {}", self.name, e);
                return ProcessingResult::failed(ProcessingError::Llm(e.to_string()));
            }
        };

        let response_length = response.content.chars().count();
        context.set(self.output_key.as_str(), response.content.as_str());

        let usage = match response.usage {
            Some(usage) => json!({
                "prompt_tokens": usage.prompt_tokens,
                "completion_tokens": usage.completion_tokens,
                "total_tokens": usage.total_tokens,
            }),
            None => Value::Null,
        };

        let mut result = ProcessingResult::completed(response.content)
            .with_metadata("processor_type", "llm")
            .with_metadata("model", self.model.as_str())
            .with_metadata("input_key", self.input_key.as_str())
            .with_metadata("output_key", self.output_key.as_str())
            .with_metadata("response_length", response_length)
            .with_metadata("message_count", request.messages.len())
            .with_metadata("temperature", self.temperature)
            .with_metadata("usage", usage)
            .with_metadata("finish_reason", response.finish_reason);

        if let Some(max_tokens) = self.max_tokens {
            result = result.with_metadata("max_tokens", max_tokens);
        }

        result
    }
}
