//! LLM clients used by [`LlmProcessor`](crate::processors::LlmProcessor)

pub mod client;
pub mod command;
pub mod echo;
pub mod request;
pub mod response;

use async_trait::async_trait;
pub use client::LlmClientConfig;
pub use command::CommandClient;
pub use echo::EchoClient;
pub use request::{ChatMessage, LlmRequest};
pub use response::{LlmError, LlmResponse, TokenUsage};

/// Trait for completion backends - allows for different implementations
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete the conversation in `request`
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}
