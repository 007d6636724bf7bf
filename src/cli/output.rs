//! CLI output formatting

use crate::{
    core::{ExecutionStatus, ProcessorRun},
    execution::ExecutionEvent,
};
use console::Emoji;
use serde_json::Value;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
        ExecutionStatus::PartiallyFailed => style("PARTIALLY FAILED").yellow().to_string(),
    }
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name,
            processor_count,
            ..
        } => format!(
            "{} Starting pipeline {} with {} processors ({})",
            ROCKET,
            style(pipeline_name).bold(),
            processor_count,
            style(short_id(run_id)).dim()
        ),
        ExecutionEvent::ProcessorStarted { processor } => {
            format!("{} {}", SPINNER, style(processor).cyan())
        }
        ExecutionEvent::ProcessorCompleted {
            processor,
            elapsed_ms,
        } => format!(
            "{} {} {}",
            CHECK,
            style(processor).green(),
            style(format!("({} ms)", elapsed_ms)).dim()
        ),
        ExecutionEvent::ProcessorFailed { processor, error } => {
            format!("{} {}: {}", CROSS, style(processor).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted { run_id, status, .. } => format!(
            "{} Pipeline ({}) {}",
            INFO,
            style(short_id(run_id)).dim(),
            format_status(*status)
        ),
    }
}

/// One line per processor result
pub fn format_run(run: &ProcessorRun) -> String {
    match run.result.error() {
        None => {
            let data = match run.result.data() {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            format!("{} {}\n{}", CHECK, style(&run.processor).bold(), format_output(&data, 5))
        }
        Some(error) => format!(
            "{} {}: {}",
            CROSS,
            style(&run.processor).bold(),
            style(error).red()
        ),
    }
}

/// Format processor output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
