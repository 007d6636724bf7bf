//! Deterministic offline client

use crate::llm::{LlmClient, LlmError, LlmRequest, LlmResponse, TokenUsage};
use async_trait::async_trait;

/// Answers every request with a fixed prefix followed by its transcript
///
/// Used by the CLI when no backend command is configured and by tests.
#[derive(Debug, Clone)]
pub struct EchoClient {
    prefix: String,
}

impl EchoClient {
    pub fn new() -> Self {
        Self {
            prefix: "Echo: ".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EchoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for EchoClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if request.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let prompt = request.transcript();
        let content = format!("{}{}", self.prefix, prompt);
        let prompt_tokens = prompt.split_whitespace().count() as u32;
        let completion_tokens = content.split_whitespace().count() as u32;

        Ok(LlmResponse::new(content, request.model.as_str())
            .with_usage(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            })
            .with_finish_reason("stop"))
    }
}
