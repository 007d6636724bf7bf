//! LLM response types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for completion calls
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A completion returned by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,

    /// Model that produced the text
    pub model: String,

    /// Token usage information (if available)
    #[serde(default)]
    pub usage: Option<TokenUsage>,

    /// Why generation stopped, e.g. `stop` or `length`
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
            finish_reason: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
