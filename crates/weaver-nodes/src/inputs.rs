use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Values delivered to a node, keyed by input port.
///
/// A port is absent when no completed upstream node feeds it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeInputs(BTreeMap<String, serde_json::Value>);

impl NodeInputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set a port, replacing any previous value.
  pub fn insert(&mut self, port: impl Into<String>, value: serde_json::Value) {
    self.0.insert(port.into(), value);
  }

  /// Append to a list-valued port, creating the list on first use.
  pub fn append(&mut self, port: impl Into<String>, value: serde_json::Value) {
    let slot = self
      .0
      .entry(port.into())
      .or_insert_with(|| serde_json::Value::Array(Vec::new()));
    match slot {
      serde_json::Value::Array(items) => items.push(value),
      other => {
        let previous = other.take();
        *other = serde_json::Value::Array(vec![previous, value]);
      }
    }
  }

  /// Value of a port, ignoring `null`.
  pub fn get(&self, port: &str) -> Option<&serde_json::Value> {
    self.0.get(port).filter(|v| !v.is_null())
  }

  /// Value of a port as a non-empty string.
  pub fn get_str(&self, port: &str) -> Option<&str> {
    self
      .get(port)
      .and_then(|v| v.as_str())
      .filter(|s| !s.is_empty())
  }

  pub fn contains(&self, port: &str) -> bool {
    self.0.contains_key(port)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
    self.0.iter()
  }
}

impl FromIterator<(String, serde_json::Value)> for NodeInputs {
  fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}
