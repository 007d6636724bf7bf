//! Processing result - the outcome record every processor returns

use crate::core::error::ProcessingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Status of a single processor invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Completed,
    Failed,
}

/// Result of a processing operation
///
/// Exactly one of `data` / `error` is populated and it always agrees with
/// `status`; the two constructors are the only way to build one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    status: ProcessingStatus,
    data: Option<Value>,
    error: Option<ProcessingError>,
    metadata: HashMap<String, Value>,
    /// Wall time spent in `process`, filled in by the executor
    #[serde(default)]
    execution_time: Option<Duration>,
}

impl ProcessingResult {
    /// A successful result carrying the produced payload
    pub fn completed(data: impl Into<Value>) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            data: Some(data.into()),
            error: None,
            metadata: HashMap::new(),
            execution_time: None,
        }
    }

    /// A failed result carrying the error
    pub fn failed(error: ProcessingError) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            data: None,
            error: Some(error),
            metadata: HashMap::new(),
            execution_time: None,
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add several metadata entries
    pub fn with_metadata_map(mut self, entries: HashMap<String, Value>) -> Self {
        self.metadata.extend(entries);
        self
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProcessingStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == ProcessingStatus::Failed
    }

    /// Produced payload (present when completed)
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Error (present when failed)
    pub fn error(&self) -> Option<&ProcessingError> {
        self.error.as_ref()
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn execution_time(&self) -> Option<Duration> {
        self.execution_time
    }

    pub(crate) fn set_execution_time(&mut self, elapsed: Duration) {
        self.execution_time = Some(elapsed);
    }
}
