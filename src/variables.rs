//! Variable scopes
//!
//! Two stores with different lifetimes back variable interpolation:
//! a scenario scope created fresh for every scenario, and a global scope
//! created once per run and shared by every scenario in it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// Text an absent variable renders as
pub const ABSENT: &str = "undefined";

/// A single variable scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Look up a variable; `None` when absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Snapshot of every variable in this scope
    pub fn get_all(&self) -> HashMap<String, Value> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Process-wide variable scope
///
/// Create one at the start of a run and hand clones of it to every
/// session; all clones share the same storage. It is never reset
/// implicitly. The lock only keeps individual reads and writes whole:
/// scenarios running concurrently still race on what they read.
#[derive(Debug, Clone, Default)]
pub struct GlobalVariables {
    inner: Arc<RwLock<Variables>>,
}

impl GlobalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(name, value);
    }

    /// Look up a variable, cloning it out of the shared store
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn get_all(&self) -> HashMap<String, Value> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_all()
    }
}

/// Merge scopes for interpolation; scenario values win over global ones
pub fn merge_scopes(global: &GlobalVariables, scenario: &Variables) -> HashMap<String, Value> {
    let mut merged = global.get_all();
    merged.extend(scenario.get_all());
    merged
}

/// Render a value as text
///
/// Strings are used verbatim; everything else uses its compact JSON form.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a possibly absent value as text
pub fn render_optional(value: Option<&Value>) -> String {
    value.map(render_value).unwrap_or_else(|| ABSENT.to_string())
}
