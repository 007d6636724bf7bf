//! Pipeline configuration from YAML

use crate::{
    core::{Context, ExecutionOutcome, Pipeline, PipelineError, Processor, ProcessorList},
    execution::{ParallelPipeline, ProcessorExecutor, SequentialPipeline, WiringError},
    llm::LlmClient,
    processors::{LlmProcessor, NoOpProcessor, PromptProcessor},
};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Root of a pipeline file; everything lives under `pipeline:`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineFile {
    pipeline: PipelineConfig,
}

/// Pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Pipeline name
    #[serde(default)]
    pub name: Option<String>,

    /// Execution mode
    #[serde(default, rename = "type")]
    pub kind: PipelineKind,

    /// Keys the caller promises to put in the initial context
    #[serde(default)]
    pub seed_keys: Vec<String>,

    /// Timeout for processors without their own (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,

    /// Processors in execution order
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    #[default]
    Sequential,
    Parallel,
}

/// One processor entry as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Unique identifier, used as the processor name unless the config sets one
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ProcessorKind,

    /// Timeout for this processor (overrides the pipeline default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Type-specific settings
    #[serde(default)]
    pub config: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    Prompt,
    Llm,
    Noop,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptSettings {
    prompt: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input_key: Option<String>,
    #[serde(default)]
    output_key: Option<String>,
    #[serde(default)]
    template_vars: HashMap<String, serde_json::Value>,
    #[serde(default = "default_strict_mode")]
    strict_mode: bool,
}

fn default_strict_mode() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmSettings {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    input_key: Option<String>,
    #[serde(default)]
    output_key: Option<String>,
    #[serde(default)]
    system_message: Option<String>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoOpSettings {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input_key: Option<String>,
    #[serde(default)]
    output_key: Option<String>,
    #[serde(default)]
    passthrough: bool,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

enum ProcessorSettings {
    Prompt(PromptSettings),
    Llm(LlmSettings),
    Noop(NoOpSettings),
}

impl ProcessorConfig {
    fn settings(&self) -> Result<ProcessorSettings> {
        fn decode<T>(value: &serde_yaml::Value) -> Result<T>
        where
            T: serde::de::DeserializeOwned + Default,
        {
            if value.is_null() {
                return Ok(T::default());
            }
            Ok(serde_yaml::from_value(value.clone())?)
        }

        let settings = match self.kind {
            ProcessorKind::Prompt => {
                ProcessorSettings::Prompt(serde_yaml::from_value(self.config.clone())?)
            }
            ProcessorKind::Llm => ProcessorSettings::Llm(decode(&self.config)?),
            ProcessorKind::Noop => ProcessorSettings::Noop(decode(&self.config)?),
        };
        Ok(settings)
    }

    /// Name the built processor will carry
    pub fn processor_name(&self) -> Result<String> {
        let name = match self.settings()? {
            ProcessorSettings::Prompt(s) => s.name,
            ProcessorSettings::Llm(s) => s.name,
            ProcessorSettings::Noop(s) => s.name,
        };
        Ok(name.unwrap_or_else(|| self.id.clone()))
    }

    /// Build the processor this entry describes
    pub fn build(&self, client: &Arc<dyn LlmClient>) -> Result<Arc<dyn Processor>> {
        let processor: Arc<dyn Processor> = match self.settings()? {
            ProcessorSettings::Prompt(s) => {
                let mut processor = PromptProcessor::new(s.prompt)
                    .with_name(s.name.unwrap_or_else(|| self.id.clone()))
                    .with_strict_mode(s.strict_mode);
                if let Some(key) = s.input_key {
                    processor = processor.with_input_key(key);
                }
                if let Some(key) = s.output_key {
                    processor = processor.with_output_key(key);
                }
                for (key, value) in s.template_vars {
                    processor.add_template_var(key, value);
                }
                Arc::new(processor)
            }
            ProcessorSettings::Llm(s) => {
                let mut processor = LlmProcessor::new(client.clone())
                    .with_name(s.name.unwrap_or_else(|| self.id.clone()));
                if let Some(model) = s.model {
                    processor = processor.with_model(model);
                }
                if let Some(key) = s.input_key {
                    processor = processor.with_input_key(key);
                }
                if let Some(key) = s.output_key {
                    processor = processor.with_output_key(key);
                }
                if let Some(message) = s.system_message {
                    processor = processor.with_system_message(message);
                }
                if let Some(temperature) = s.temperature {
                    processor = processor.with_temperature(temperature);
                }
                if let Some(max_tokens) = s.max_tokens {
                    processor = processor.with_max_tokens(max_tokens);
                }
                Arc::new(processor)
            }
            ProcessorSettings::Noop(s) => {
                let mut processor = NoOpProcessor::new()
                    .with_name(s.name.unwrap_or_else(|| self.id.clone()))
                    .with_passthrough(s.passthrough);
                if let Some(key) = s.input_key {
                    processor = processor.with_input_key(key);
                }
                if let Some(key) = s.output_key {
                    processor = processor.with_output_key(key);
                }
                for (key, value) in s.metadata {
                    processor = processor.with_metadata(key, value);
                }
                Arc::new(processor)
            }
        };
        Ok(processor)
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid pipeline file {}", path.display()))
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: PipelineFile = serde_yaml::from_str(yaml)?;
        file.pipeline.validate()?;
        Ok(file.pipeline)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();
        for processor in &self.processors {
            if processor.id.trim().is_empty() {
                anyhow::bail!("Processor id must not be empty");
            }
            if !seen_ids.insert(processor.id.as_str()) {
                anyhow::bail!("Duplicate processor ID: {}", processor.id);
            }
            // Timeouts and results are keyed by name, so names must be unique too
            let name = processor
                .processor_name()
                .with_context(|| format!("Invalid config for processor '{}'", processor.id))?;
            if !seen_names.insert(name.clone()) {
                anyhow::bail!("Duplicate processor name: {} (processor '{}')", name, processor.id);
            }
            if processor.timeout_secs == Some(0) {
                anyhow::bail!("Processor '{}' has a zero timeout", processor.id);
            }
        }

        if self.default_timeout_secs == Some(0) {
            anyhow::bail!("default_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Build the pipeline, wiring LLM processors to `client`
    pub fn build(&self, client: Arc<dyn LlmClient>) -> Result<ConfiguredPipeline> {
        let mut pipeline = match (self.kind, &self.name) {
            (PipelineKind::Sequential, Some(name)) => {
                ConfiguredPipeline::Sequential(SequentialPipeline::new(name.as_str()))
            }
            (PipelineKind::Sequential, None) => {
                ConfiguredPipeline::Sequential(SequentialPipeline::default())
            }
            (PipelineKind::Parallel, Some(name)) => {
                ConfiguredPipeline::Parallel(ParallelPipeline::new(name.as_str()))
            }
            (PipelineKind::Parallel, None) => {
                ConfiguredPipeline::Parallel(ParallelPipeline::default())
            }
        };

        for entry in &self.processors {
            let processor = entry
                .build(&client)
                .with_context(|| format!("Failed to build processor '{}'", entry.id))?;
            if let Some(secs) = entry.timeout_secs {
                pipeline.set_processor_timeout(processor.name(), Duration::from_secs(secs));
            }
            pipeline.add_processor(processor);
        }

        pipeline
            .add_seed_keys(self.seed_keys.iter().cloned())
            .set_default_timeout(self.default_timeout_secs.map(Duration::from_secs));

        Ok(pipeline)
    }
}

/// A pipeline built from configuration, in whichever mode it declared
#[derive(Debug)]
pub enum ConfiguredPipeline {
    Sequential(SequentialPipeline),
    Parallel(ParallelPipeline),
}

impl ConfiguredPipeline {
    pub fn kind(&self) -> PipelineKind {
        match self {
            ConfiguredPipeline::Sequential(_) => PipelineKind::Sequential,
            ConfiguredPipeline::Parallel(_) => PipelineKind::Parallel,
        }
    }
}

#[async_trait]
impl Pipeline for ConfiguredPipeline {
    fn processor_list(&self) -> &ProcessorList {
        match self {
            ConfiguredPipeline::Sequential(p) => p.processor_list(),
            ConfiguredPipeline::Parallel(p) => p.processor_list(),
        }
    }

    fn processor_list_mut(&mut self) -> &mut ProcessorList {
        match self {
            ConfiguredPipeline::Sequential(p) => p.processor_list_mut(),
            ConfiguredPipeline::Parallel(p) => p.processor_list_mut(),
        }
    }

    fn executor_mut(&mut self) -> &mut ProcessorExecutor {
        match self {
            ConfiguredPipeline::Sequential(p) => p.executor_mut(),
            ConfiguredPipeline::Parallel(p) => p.executor_mut(),
        }
    }

    fn check_wiring(&self, available: &HashSet<String>) -> Vec<WiringError> {
        match self {
            ConfiguredPipeline::Sequential(p) => p.check_wiring(available),
            ConfiguredPipeline::Parallel(p) => p.check_wiring(available),
        }
    }

    async fn execute(&self, context: Context) -> Result<ExecutionOutcome, PipelineError> {
        match self {
            ConfiguredPipeline::Sequential(p) => p.execute(context).await,
            ConfiguredPipeline::Parallel(p) => p.execute(context).await,
        }
    }
}
