//! Test: Wiring validation - declared keys checked before execution

use crate::helpers::*;
use llm_processors::core::{Pipeline, PipelineError};
use llm_processors::execution::{ParallelPipeline, SequentialPipeline, WiringError};
use serde_json::json;
use std::sync::atomic::Ordering;

/// A sequence reading a key nothing provides is reported with its position
#[test]
fn test_missing_input_reported_with_position() {
    let pipeline = SequentialPipeline::with_processors(
        "broken",
        vec![
            writer("First", "a", json!(1)).shared(),
            copier("Second", "b", "c").shared(),
        ],
    );

    let errors = pipeline.validate_pipeline();

    assert_eq!(
        errors,
        vec![WiringError::MissingInputKey {
            processor: "Second".to_string(),
            position: 1,
            key: "b".to_string(),
        }]
    );
    assert!(!pipeline.is_validated());
}

/// Seed keys satisfy the first processor
#[test]
fn test_seed_keys_satisfy_inputs() {
    let mut pipeline = SequentialPipeline::with_processors(
        "seeded",
        vec![
            copier("Prompt", "topic", "prompt").shared(),
            copier("Answer", "prompt", "answer").shared(),
        ],
    );
    assert_eq!(pipeline.validate_pipeline().len(), 1);

    pipeline.add_seed_keys(["topic"]);
    assert!(pipeline.validate_pipeline().is_empty());
    assert!(pipeline.is_validated());
}

/// Every problem is reported, not just the first
#[test]
fn test_all_problems_reported() {
    let pipeline = SequentialPipeline::with_processors(
        "many",
        vec![
            copier("A", "x", "y").shared(),
            copier("B", "z", "w").shared(),
            copier("C", "y", "v").shared(),
        ],
    );

    let errors = pipeline.validate_pipeline();
    let missing: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            WiringError::MissingInputKey { key, .. } => Some(key.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(missing, vec!["x", "z"]);
}

/// Parallel siblings cannot feed each other
#[test]
fn test_parallel_sibling_output_is_not_available() {
    let pipeline = ParallelPipeline::with_processors(
        "siblings",
        vec![
            writer("Producer", "draft", json!("d")).shared(),
            copier("Consumer", "draft", "final").shared(),
        ],
    );

    let errors = pipeline.validate_pipeline();

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        WiringError::MissingInputKey { processor, key, .. }
            if processor == "Consumer" && key == "draft"
    ));
}

/// Empty pipelines of either kind have nothing to report
#[test]
fn test_empty_pipelines_validate_cleanly() {
    let sequential = SequentialPipeline::default();
    assert!(sequential.validate_pipeline().is_empty());
    assert!(sequential.is_validated());

    let parallel = ParallelPipeline::default();
    assert!(parallel.validate_pipeline().is_empty());
    assert!(parallel.is_validated());
}

/// A parallel group with distinct outputs and available inputs is clean
#[test]
fn test_parallel_distinct_outputs_validate_cleanly() {
    let mut pipeline = ParallelPipeline::with_processors(
        "fan-out",
        vec![
            copier("Summary", "document", "summary").shared(),
            copier("Keywords", "document", "keywords").shared(),
            writer("Stamp", "stamp", json!("v1")).shared(),
        ],
    );
    assert_eq!(pipeline.validate_pipeline().len(), 2);

    pipeline.add_seed_keys(["document"]);
    assert!(pipeline.validate_pipeline().is_empty());
    assert!(pipeline.is_validated());
}

/// Output conflicts within a group name every claimant once
#[test]
fn test_parallel_conflict_names_all_claimants() {
    let pipeline = ParallelPipeline::with_processors(
        "conflicts",
        vec![
            writer("A", "shared", json!(1)).shared(),
            writer("B", "own", json!(2)).shared(),
            writer("C", "shared", json!(3)).shared(),
            writer("D", "shared", json!(4)).shared(),
        ],
    );

    let errors = pipeline.validate_pipeline();

    assert_eq!(
        errors,
        vec![WiringError::ConflictingOutputKey {
            key: "shared".to_string(),
            processors: vec!["A".to_string(), "C".to_string(), "D".to_string()],
        }]
    );
}

/// A clean validation is cleared by any later change
#[test]
fn test_changes_clear_validated_flag() {
    let mut pipeline =
        SequentialPipeline::with_processors("flag", vec![writer("A", "a", json!(1)).shared()]);
    assert!(pipeline.validate_pipeline().is_empty());
    assert!(pipeline.is_validated());

    pipeline.add_processor(writer("B", "b", json!(2)).shared());
    assert!(!pipeline.is_validated());

    assert!(pipeline.validate_pipeline().is_empty());
    assert!(pipeline.remove_processor("B"));
    assert!(!pipeline.is_validated());
}

/// Validation is advisory: execute still runs a mis-wired pipeline
#[tokio::test]
async fn test_execute_ignores_wiring_errors() {
    let pipeline = SequentialPipeline::with_processors(
        "advisory",
        vec![copier("Copy", "absent", "out").shared()],
    );
    assert_eq!(pipeline.validate_pipeline().len(), 1);

    let outcome = pipeline.execute(context_of(&[("absent", json!("here"))])).await.unwrap();

    assert_completed(&outcome);
}

/// execute_validated refuses before any processor runs
#[tokio::test]
async fn test_execute_validated_refuses_without_running() {
    let first = writer("First", "a", json!(1));
    let calls = first.calls();
    let pipeline = SequentialPipeline::with_processors(
        "strict",
        vec![first.shared(), copier("Second", "missing", "b").shared()],
    );

    let result = pipeline.execute_validated(context_of(&[])).await;

    match result {
        Err(PipelineError::Validation(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("Expected validation error, got {:?}", other.map(|o| o.status)),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let outcome = pipeline
        .execute_validated(context_of(&[("missing", json!("now present"))]))
        .await
        .unwrap();
    assert_completed(&outcome);
}
