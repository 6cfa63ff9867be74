use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Variable name to last evaluated value, sent with every evaluation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableBindings {
    values: HashMap<String, String>,
}

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        tracing::debug!(%name, %value, "variable binding updated");
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_existing_value() {
        let mut bindings = VariableBindings::new();
        bindings.upsert("x", "5");
        bindings.upsert("y", "2");
        bindings.upsert("x", "7");

        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.get("x"), Some("7"));
        assert_eq!(bindings.get("z"), None);
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let mut bindings = VariableBindings::new();
        bindings.upsert("x", "5");
        let snapshot = bindings.snapshot();
        bindings.clear();

        assert!(bindings.is_empty());
        assert_eq!(snapshot.get("x").map(String::as_str), Some("5"));
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let mut bindings = VariableBindings::new();
        bindings.upsert("x", "5");
        let json = serde_json::to_value(&bindings).expect("bindings should serialize");
        assert_eq!(json, serde_json::json!({ "x": "5" }));
    }
}
