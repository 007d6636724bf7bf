//! Client that runs an external command per completion

use crate::llm::{LlmClient, LlmClientConfig, LlmError, LlmRequest, LlmResponse};
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Calls an executable with the request transcript as its last argument and
/// reads the completion from stdout
///
/// The model and temperature are passed in the `LLM_MODEL` and
/// `LLM_TEMPERATURE` environment variables, `LLM_MAX_TOKENS` when set.
#[derive(Debug, Clone)]
pub struct CommandClient {
    program: String,
    args: Vec<String>,
    config: LlmClientConfig,
}

impl CommandClient {
    pub fn new(program: impl Into<String>, config: LlmClientConfig) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            config,
        }
    }

    /// Arguments placed before the prompt
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl LlmClient for CommandClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if request.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let model = if request.model.is_empty() {
            self.config.default_model.as_str()
        } else {
            request.model.as_str()
        };
        let prompt = request.transcript();
        debug!("Spawning {} with prompt length: {}", self.program, prompt.len());

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&prompt)
            .env("LLM_MODEL", model)
            .env("LLM_TEMPERATURE", request.temperature.to_string())
            .kill_on_drop(true);
        if let Some(max_tokens) = request.max_tokens {
            command.env("LLM_MAX_TOKENS", max_tokens.to_string());
        }

        let result = timeout(self.config.timeout, command.output())
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout.as_secs()))?;

        let output = result
            .map_err(|e| LlmError::Internal(format!("Failed to execute {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", self.program, exit_code, stderr.trim());
            return Err(LlmError::Backend(format!(
                "{} exited with code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            )));
        }

        let content = String::from_utf8(output.stdout)
            .map_err(|e| LlmError::Internal(format!("Failed to decode output: {}", e)))?;
        debug!("{} returned {} bytes of output", self.program, content.len());

        Ok(LlmResponse::new(content.trim_end(), model).with_finish_reason("stop"))
    }
}
