//! Prompt templating processor

use crate::core::{Context, ProcessingError, ProcessingResult, Processor};
use async_trait::async_trait;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::{json, Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const TEMPLATE_MARKERS: [&str; 3] = ["{{", "{%", "{#"];

/// Renders a Jinja-style prompt and stores it in the context
///
/// Templates support `{{ user.name }}` lookups, filters such as
/// `{{ topic | upper }}` and `{% if %}` / `{% for %}` blocks. Values are looked
/// up, from lowest to highest priority, in the context data, in the object
/// stored under the optional input key, and in the processor's static
/// template variables. In strict mode any undefined value fails the
/// processor; otherwise it renders empty.
#[derive(Debug, Clone)]
pub struct PromptProcessor {
    name: String,
    prompt: String,
    output_key: String,
    input_key: Option<String>,
    template_vars: HashMap<String, Value>,
    strict: bool,
    required: BTreeSet<String>,
}

impl PromptProcessor {
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        // Unparsable templates report their syntax error when rendered
        let required: BTreeSet<String> = Environment::new()
            .template_from_str(&prompt)
            .map(|template| template.undeclared_variables(false).into_iter().collect())
            .unwrap_or_default();

        Self {
            name: "PromptProcessor".to_string(),
            prompt,
            output_key: "prompt".to_string(),
            input_key: None,
            template_vars: HashMap::new(),
            strict: true,
            required,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    /// Context key holding an object of template variables
    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn with_template_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template_vars.insert(key.into(), value.into());
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn add_template_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.template_vars.insert(key.into(), value.into());
    }

    pub fn remove_template_var(&mut self, key: &str) -> Option<Value> {
        self.template_vars.remove(key)
    }

    /// True when the prompt contains template syntax
    pub fn is_template(&self) -> bool {
        TEMPLATE_MARKERS.iter().any(|marker| self.prompt.contains(marker))
    }

    /// Top-level variable names the template reads
    pub fn required_variables(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Render against explicit variables, ignoring any context
    ///
    /// `vars` sits below the static template variables in priority.
    pub fn render(&self, vars: &HashMap<String, Value>) -> Result<String, ProcessingError> {
        let mut merged: HashMap<&str, &Value> = vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        merged.extend(self.template_vars.iter().map(|(k, v)| (k.as_str(), v)));
        self.render_with(&merged)
    }

    fn render_with(&self, vars: &HashMap<&str, &Value>) -> Result<String, ProcessingError> {
        if !self.is_template() {
            return Ok(self.prompt.clone());
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(if self.strict {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });

        env.render_str(&self.prompt, vars).map_err(|e| {
            let missing: Vec<&str> = self
                .required
                .iter()
                .map(String::as_str)
                .filter(|name| !vars.contains_key(name))
                .collect();
            if matches!(e.kind(), ErrorKind::UndefinedError) && !missing.is_empty() {
                ProcessingError::Template(format!(
                    "Missing required template variables: {}",
                    missing.join(", ")
                ))
            } else {
                ProcessingError::Template(e.to_string())
            }
        })
    }

    fn template_context<'a>(&'a self, context: &'a Context) -> HashMap<&'a str, &'a Value> {
        let mut vars: HashMap<&str, &Value> = context
            .data()
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        if let Some(input_key) = &self.input_key {
            match context.get(input_key) {
                Some(Value::Object(object)) => vars.extend(object_vars(object)),
                Some(_) => debug!("{}: '{}' is not an object, ignoring", self.name, input_key),
                None => {}
            }
        }

        vars.extend(self.template_vars.iter().map(|(k, v)| (k.as_str(), v)));
        vars
    }
}

fn object_vars(object: &Map<String, Value>) -> impl Iterator<Item = (&str, &Value)> {
    object.iter().map(|(k, v)| (k.as_str(), v))
}

#[async_trait]
impl Processor for PromptProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_key(&self) -> Option<&str> {
        self.input_key.as_deref()
    }

    fn output_key(&self) -> Option<&str> {
        Some(&self.output_key)
    }

    async fn process(&self, context: &mut Context) -> ProcessingResult {
        let rendered = match self.render_with(&self.template_context(context)) {
            Ok(rendered) => rendered,
            Err(e) => return ProcessingResult::failed(e),
        };

        let prompt_length = rendered.chars().count();
        context.set(self.output_key.as_str(), rendered.as_str());

        let mut result = ProcessingResult::completed(rendered)
            .with_metadata("processor_type", "prompt")
            .with_metadata("prompt_length", prompt_length)
            .with_metadata("output_key", self.output_key.as_str())
            .with_metadata("is_template", self.is_template());

        if self.is_template() {
            let mut provided: Vec<&String> = self.template_vars.keys().collect();
            provided.sort();
            result = result
                .with_metadata("template_vars_needed", json!(self.required))
                .with_metadata("template_vars_provided", json!(provided));
        }

        result
    }
}
