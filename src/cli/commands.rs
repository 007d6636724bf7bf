//! CLI command definitions

use clap::Args;
use serde_json::Value;
use std::collections::HashMap;

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Initial context values (key=value, values parsed as JSON when possible)
    #[arg(long, value_parser = parse_key_value)]
    pub var: Vec<(String, String)>,

    /// Refuse to run when the wiring does not validate
    #[arg(long)]
    pub validate: bool,

    /// Executable used for completions; prompts are echoed back when unset
    #[arg(long)]
    pub llm_command: Option<String>,

    /// Timeout for one completion call (in seconds)
    #[arg(long, default_value_t = 120)]
    pub llm_timeout_secs: u64,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    /// Initial context data built from `--var`
    pub fn initial_data(&self) -> HashMap<String, Value> {
        self.var
            .iter()
            .map(|(key, raw)| (key.clone(), parse_var_value(raw)))
            .collect()
    }
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}

/// JSON when the text parses as JSON, a plain string otherwise
pub fn parse_var_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
