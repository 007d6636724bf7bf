//! LLM request types

use serde::{Deserialize, Serialize};

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// A completion request handed to an [`LlmClient`](crate::llm::LlmClient)
///
/// The system message, when set, is sent ahead of `messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system_message: None,
            temperature: 0.6,
            max_tokens: None,
        }
    }

    /// Request holding a single user message
    pub fn from_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(model).with_message(ChatMessage::user(prompt))
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages<I>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = ChatMessage>,
    {
        self.messages.extend(messages);
        self
    }

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

    /// Every message in send order, system message first
    pub fn conversation(&self) -> Vec<ChatMessage> {
        self.system_message
            .iter()
            .map(ChatMessage::system)
            .chain(self.messages.iter().cloned())
            .collect()
    }

    /// True when no message carries any text
    pub fn is_empty(&self) -> bool {
        self.messages.iter().all(|m| m.content.trim().is_empty())
    }

    /// Flatten the conversation for text-only backends
    ///
    /// A lone user message renders as its content. Anything else renders one
    /// `role: content` line per message.
    pub fn transcript(&self) -> String {
        match (self.system_message.as_ref(), self.messages.as_slice()) {
            (None, [only]) if only.role == "user" => only.content.clone(),
            _ => self
                .conversation()
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
