//! Static wiring validation over declared input/output keys
//!
//! Validation only looks at the keys each processor declares; it never runs a
//! processor and never looks at values. Every problem found is reported, so a
//! caller can fix a pipeline in one pass.

use crate::core::Processor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// A wiring problem found before execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    /// A processor reads a key nothing before it produces
    #[error(
        "Processor {processor} at position {position} requires input '{key}' \
         which is not available"
    )]
    MissingInputKey {
        processor: String,
        position: usize,
        key: String,
    },

    /// Several processors in one parallel group write the same key
    #[error(
        "Processors {} produce output '{key}' that conflicts within the parallel group",
        .processors.join(", ")
    )]
    ConflictingOutputKey { key: String, processors: Vec<String> },
}

/// Check a sequential chain.
///
/// `available` holds the keys assumed present before the first processor.
/// Each processor's output becomes available to the processors after it.
pub fn validate_sequence(
    processors: &[Arc<dyn Processor>],
    available: &HashSet<String>,
) -> Vec<WiringError> {
    let mut available = available.clone();
    let mut errors = Vec::new();

    for (position, processor) in processors.iter().enumerate() {
        if let Some(key) = processor.input_key() {
            if !available.contains(key) {
                errors.push(WiringError::MissingInputKey {
                    processor: processor.name().to_string(),
                    position,
                    key: key.to_string(),
                });
            }
        }

        if let Some(key) = processor.output_key() {
            available.insert(key.to_string());
        }
    }

    errors
}

/// Check a parallel group.
///
/// Inputs are checked against `available` only: siblings cannot satisfy each
/// other. Each output key claimed by more than one processor yields exactly
/// one conflict naming every claimant.
pub fn validate_parallel(
    processors: &[Arc<dyn Processor>],
    available: &HashSet<String>,
) -> Vec<WiringError> {
    let mut errors = Vec::new();

    for (position, processor) in processors.iter().enumerate() {
        if let Some(key) = processor.input_key() {
            if !available.contains(key) {
                errors.push(WiringError::MissingInputKey {
                    processor: processor.name().to_string(),
                    position,
                    key: key.to_string(),
                });
            }
        }
    }

    // First-claim order keeps the report deterministic
    let mut claims: Vec<(String, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for processor in processors {
        let Some(key) = processor.output_key() else {
            continue;
        };
        match index.get(key) {
            Some(&i) => claims[i].1.push(processor.name().to_string()),
            None => {
                index.insert(key.to_string(), claims.len());
                claims.push((key.to_string(), vec![processor.name().to_string()]));
            }
        }
    }

    errors.extend(
        claims
            .into_iter()
            .filter(|(_, claimants)| claimants.len() > 1)
            .map(|(key, processors)| WiringError::ConflictingOutputKey { key, processors }),
    );

    errors
}
