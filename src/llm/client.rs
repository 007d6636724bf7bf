//! LLM client configuration

use std::time::Duration;

/// Settings shared by client implementations
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Model used when a processor does not name one
    pub default_model: String,

    /// Upper bound on a single completion
    pub timeout: Duration,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
