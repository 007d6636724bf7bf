//! Test: YAML pipelines - configuration built into runnable pipelines

use crate::helpers::*;
use llm_processors::core::{ExecutionStatus, Pipeline, PipelineConfig, PipelineKind};
use serde_json::json;
use std::sync::Arc;

const QA_PIPELINE: &str = r#"
pipeline:
  name: qa
  type: sequential
  seed_keys: [topic]
  processors:
    - id: Prompt
      type: prompt
      config:
        prompt: "Explain {{ topic }} to a {{ audience }}"
        template_vars:
          audience: beginner
    - id: Answer
      type: llm
      config:
        model: small
        output_key: answer
    - id: Log
      type: noop
      config:
        input_key: answer
        output_key: final
        passthrough: true
"#;

#[tokio::test]
async fn test_yaml_sequential_end_to_end() {
    let llm = Arc::new(MockLlm::new(vec!["Borrowing lends access."]));
    let pipeline = PipelineConfig::from_yaml(QA_PIPELINE)
        .unwrap()
        .build(llm.clone())
        .unwrap();

    assert_eq!(pipeline.kind(), PipelineKind::Sequential);
    assert!(pipeline.validate_pipeline().is_empty());

    let outcome = pipeline
        .execute(context_of(&[("topic", json!("borrowing"))]))
        .await
        .unwrap();

    assert_completed(&outcome);
    assert_history(&outcome, &["Prompt", "Answer", "Log"]);
    assert_eq!(llm.prompts(), vec!["Explain borrowing to a beginner"]);
    assert_eq!(outcome.context.get_str("final"), Some("Borrowing lends access."));
    assert_eq!(
        outcome.result_for("Answer").unwrap().metadata().get("model"),
        Some(&json!("small"))
    );
}

#[tokio::test]
async fn test_yaml_chat_settings_reach_the_client() {
    let yaml = r#"
pipeline:
  seed_keys: [conversation]
  processors:
    - id: Chat
      type: llm
      config:
        input_key: conversation
        system_message: You are terse
        temperature: 0.2
        max_tokens: 64
"#;
    let llm = Arc::new(MockLlm::new(vec!["Fine."]));
    let pipeline = PipelineConfig::from_yaml(yaml)
        .unwrap()
        .build(llm.clone())
        .unwrap();
    let conversation = json!({"messages": [
        {"role": "user", "content": "Hello"},
        {"role": "assistant", "content": "Hi"},
        {"role": "user", "content": "How are you?"}
    ]});

    let outcome = pipeline
        .execute(context_of(&[("conversation", conversation)]))
        .await
        .unwrap();

    assert_completed(&outcome);
    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system_message.as_deref(), Some("You are terse"));
    assert_eq!(requests[0].temperature, 0.2);
    assert_eq!(requests[0].max_tokens, Some(64));
    let contents: Vec<&str> = requests[0].messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Hello", "Hi", "How are you?"]);
    assert_eq!(outcome.context.get_str("llm_response"), Some("Fine."));
}

#[tokio::test]
async fn test_yaml_parallel_partial_failure() {
    let yaml = r#"
pipeline:
  name: fan-out
  type: parallel
  processors:
    - id: Summary
      type: llm
      config: { input_key: text, output_key: summary }
    - id: Keywords
      type: llm
      config: { input_key: text, output_key: keywords }
"#;
    // One scripted response: whichever branch asks second gets an error
    let llm = Arc::new(MockLlm::new(vec!["only one answer"]));
    let pipeline = PipelineConfig::from_yaml(yaml).unwrap().build(llm).unwrap();

    let outcome = pipeline
        .execute(context_of(&[("text", json!("a long document"))]))
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::PartiallyFailed);
    assert_eq!(outcome.failed_processors().len(), 1);
    assert_history(&outcome, &["Summary", "Keywords"]);
}

#[tokio::test]
async fn test_yaml_from_file() {
    let path = std::env::temp_dir().join(format!("llm-processors-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(&path, QA_PIPELINE).unwrap();

    let config = PipelineConfig::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    let config = config.unwrap();
    assert_eq!(config.name.as_deref(), Some("qa"));
    assert_eq!(config.processors.len(), 3);
}

#[test]
fn test_missing_file_error_names_path() {
    let error = PipelineConfig::from_file("/nonexistent/pipeline.yaml").unwrap_err();
    assert!(error.to_string().contains("/nonexistent/pipeline.yaml"));
}

#[test]
fn test_processor_timeouts_from_yaml() {
    let yaml = r#"
pipeline:
  default_timeout_secs: 10
  processors:
    - id: Quick
      type: noop
      timeout_secs: 1
"#;
    let config = PipelineConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.default_timeout_secs, Some(10));
    assert_eq!(config.processors[0].timeout_secs, Some(1));

    let pipeline = config.build(Arc::new(MockLlm::new(vec![]))).unwrap();
    assert_eq!(pipeline.len(), 1);
    assert_eq!(pipeline.processors()[0].name(), "Quick");
}
