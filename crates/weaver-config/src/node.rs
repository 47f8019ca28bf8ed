use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;

/// A node as saved by the authoring surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
  pub id: String,
  #[serde(alias = "type")]
  pub kind: NodeKind,
  /// Kind-specific settings (text, model name, crop percentages, ...).
  #[serde(default, alias = "data")]
  pub configuration: serde_json::Map<String, serde_json::Value>,
  /// Output cached from a previous run.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_output: Option<serde_json::Value>,
}

impl NodeDef {
  pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
    Self {
      id: id.into(),
      kind,
      configuration: serde_json::Map::new(),
      last_output: None,
    }
  }

  /// Builder-style helper for setting a configuration entry.
  pub fn with_config(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
    self.configuration.insert(key.into(), value.into());
    self
  }
}
