//! Pipeline context - the key/value state threaded through a run

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Execution context for a pipeline run
///
/// Holds the values processors read and write, the names of the processors
/// that ran (in order), and free-form run metadata. Reading an absent key is
/// a plain miss (`None`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Unique run identifier
    pub run_id: Uuid,

    /// Values produced so far (last write wins)
    data: HashMap<String, Value>,

    /// Names of processors in the order they ran
    history: Vec<String>,

    /// Metadata about the run
    metadata: HashMap<String, Value>,

    /// Keys written or removed since this context was forked (not serialized)
    #[serde(skip)]
    touched: Option<HashSet<String>>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            data: HashMap::new(),
            history: Vec::new(),
            metadata: HashMap::new(),
            touched: None,
        }
    }

    /// Create a context pre-seeded with data
    pub fn with_data(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            ..Self::new()
        }
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a value as a string slice, if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Get a value converted to `T`. A value of the wrong shape is a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        self.touch(&key);
        self.data.insert(key, value.into());
    }

    /// Set several values at once
    pub fn update<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in values {
            self.set(key, value);
        }
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove and return a value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.touch(key);
        }
        removed
    }

    /// Iterate over the present keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// All values
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove all values. History and metadata are kept.
    pub fn clear(&mut self) {
        let keys: Vec<String> = self.data.keys().cloned().collect();
        for key in keys {
            self.touch(&key);
        }
        self.data.clear();
    }

    /// Append a processor name to the execution history
    pub fn record(&mut self, processor_name: impl Into<String>) {
        self.history.push(processor_name.into());
    }

    /// Execution history, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Add a metadata entry
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get a metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Copy of this context for one parallel branch.
    ///
    /// The fork starts with an empty history and remembers every key it
    /// writes or removes so [`Context::merge`] can replay exactly that delta.
    pub(crate) fn fork(&self) -> Self {
        Self {
            run_id: self.run_id,
            data: self.data.clone(),
            history: Vec::new(),
            metadata: self.metadata.clone(),
            touched: Some(HashSet::new()),
        }
    }

    /// Apply a fork's writes, removals, metadata and history to this context.
    pub(crate) fn merge(&mut self, fork: Context) {
        let Context {
            data: mut fork_data,
            history,
            metadata,
            touched,
            ..
        } = fork;

        for key in touched.unwrap_or_default() {
            match fork_data.remove(&key) {
                Some(value) => self.set(key, value),
                None => {
                    self.remove(&key);
                }
            }
        }

        self.metadata.extend(metadata);
        self.history.extend(history);
    }

    fn touch(&mut self, key: &str) {
        if let Some(touched) = self.touched.as_mut() {
            touched.insert(key.to_string());
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.data.insert(key.into(), value);
        }
        context
    }
}
