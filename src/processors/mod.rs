//! Ready-made processors
//!
//! Each processor declares its keys through the [`Processor`](crate::core::Processor)
//! contract so pipelines can validate wiring before running.

pub mod llm;
pub mod noop;
pub mod prompt;
pub mod transform;

pub use llm::LlmProcessor;
pub use noop::NoOpProcessor;
pub use prompt::PromptProcessor;
pub use transform::DataTransformProcessor;

use serde_json::Value;

/// Short type name of a JSON value, used in result metadata
pub(crate) fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
