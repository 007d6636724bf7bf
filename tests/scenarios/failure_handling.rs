//! Test: Failure handling - failed results, panics and timeouts

use crate::helpers::*;
use llm_processors::core::{ExecutionStatus, Pipeline, PipelineError, ProcessingError};
use llm_processors::execution::{ParallelPipeline, SequentialPipeline};
use llm_processors::processors::LlmProcessor;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A failed result stops a sequence; later processors never run
#[tokio::test]
async fn test_sequence_stops_at_failure() {
    let last = writer("Last", "c", json!(3));
    let last_calls = last.calls();
    let pipeline = SequentialPipeline::with_processors(
        "stops",
        vec![
            writer("First", "a", json!(1)).shared(),
            ScriptedProcessor::new("Broken", Behavior::Fail("bad input".to_string())).shared(),
            last.shared(),
        ],
    );

    let outcome = pipeline.execute(context_of(&[])).await.unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Failed);
    assert_processor_failed(&outcome, "Broken", "bad input");
    assert_history(&outcome, &["First", "Broken"]);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(last_calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.context.get("a"), Some(&json!(1)));
}

/// A panic is a defect: the run aborts with an error naming the processor
#[tokio::test]
async fn test_panic_aborts_sequence() {
    let after = writer("After", "b", json!(2));
    let after_calls = after.calls();
    let pipeline = SequentialPipeline::with_processors(
        "panics",
        vec![
            ScriptedProcessor::new("Defect", Behavior::Panic("index out of range".to_string()))
                .shared(),
            after.shared(),
        ],
    );

    let error = pipeline.execute(context_of(&[])).await.unwrap_err();

    match error {
        PipelineError::ProcessorPanicked { processor, message } => {
            assert_eq!(processor, "Defect");
            assert!(message.contains("index out of range"));
        }
        other => panic!("Expected ProcessorPanicked, got {:?}", other),
    }
    assert_eq!(after_calls.load(Ordering::SeqCst), 0);
}

/// A panicking branch aborts the parallel group
#[tokio::test]
async fn test_panic_aborts_parallel_group() {
    let pipeline = ParallelPipeline::with_processors(
        "panics",
        vec![
            writer("Slow", "a", json!(1)).after(Duration::from_secs(5)).shared(),
            ScriptedProcessor::new("Defect", Behavior::Panic("boom".to_string())).shared(),
        ],
    );

    let started = Instant::now();
    let error = pipeline.execute(context_of(&[])).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::ProcessorPanicked { ref processor, .. } if processor == "Defect"
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// A timed-out processor fails like any other
#[tokio::test]
async fn test_timeout_fails_processor() {
    let mut pipeline = SequentialPipeline::with_processors(
        "timeouts",
        vec![writer("Slow", "a", json!(1)).after(Duration::from_secs(5)).shared()],
    );
    pipeline.set_processor_timeout("Slow", Duration::from_millis(20));

    let outcome = pipeline.execute(context_of(&[])).await.unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Failed);
    assert!(matches!(
        outcome.result_for("Slow").unwrap().error(),
        Some(ProcessingError::Timeout { .. })
    ));
    assert!(!outcome.context.contains_key("a"));
}

/// The default timeout applies to every processor without its own
#[tokio::test]
async fn test_default_timeout_in_parallel_group() {
    let mut pipeline = ParallelPipeline::with_processors(
        "default-timeout",
        vec![
            writer("Quick", "a", json!(1)).shared(),
            writer("Stuck", "b", json!(2)).after(Duration::from_secs(5)).shared(),
        ],
    );
    pipeline.set_default_timeout(Some(Duration::from_millis(30)));

    let outcome = pipeline.execute(context_of(&[])).await.unwrap();

    assert_eq!(outcome.status, ExecutionStatus::PartiallyFailed);
    assert_processor_failed(&outcome, "Stuck", "timed out");
    assert!(outcome.context.contains_key("a"));
}

/// `run` reports the first failure as an error
#[tokio::test]
async fn test_run_surfaces_failure() {
    let pipeline = SequentialPipeline::with_processors(
        "run",
        vec![ScriptedProcessor::new("Broken", Behavior::Fail("nope".to_string())).shared()],
    );

    let error = pipeline.run(Default::default()).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::ProcessorFailed { ref processor, error: ProcessingError::Other(ref m) }
            if processor == "Broken" && m == "nope"
    ));
}

/// LLM client errors become failed results, not errors
#[tokio::test]
async fn test_llm_errors_are_expected_failures() {
    let llm = Arc::new(MockLlm::new(vec![]));
    let pipeline =
        SequentialPipeline::new("llm").with_processor(LlmProcessor::new(llm).with_name("Answer"));

    let outcome = pipeline
        .execute(context_of(&[("prompt", json!("hello"))]))
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Failed);
    assert_processor_failed(&outcome, "Answer", "No response available");
}
