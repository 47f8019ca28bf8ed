use serde::{Deserialize, Serialize};

/// Port assumed when an edge doesn't name its target handle.
pub const DEFAULT_TARGET_PORT: &str = "input";

/// Port assumed when an edge doesn't name its source handle.
pub const DEFAULT_SOURCE_PORT: &str = "output";

/// A directed connection from one node's output port to another node's
/// input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  #[serde(default)]
  pub id: String,
  #[serde(alias = "source")]
  pub source_node_id: String,
  #[serde(
    default = "default_source_port",
    alias = "sourceHandle",
    deserialize_with = "port_or_default::source"
  )]
  pub source_port: String,
  #[serde(alias = "target")]
  pub target_node_id: String,
  #[serde(
    default = "default_target_port",
    alias = "targetHandle",
    deserialize_with = "port_or_default::target"
  )]
  pub target_port: String,
}

impl EdgeDef {
  pub fn new(
    id: impl Into<String>,
    source_node_id: impl Into<String>,
    source_port: impl Into<String>,
    target_node_id: impl Into<String>,
    target_port: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      source_node_id: source_node_id.into(),
      source_port: source_port.into(),
      target_node_id: target_node_id.into(),
      target_port: target_port.into(),
    }
  }
}

fn default_source_port() -> String {
  DEFAULT_SOURCE_PORT.to_string()
}

fn default_target_port() -> String {
  DEFAULT_TARGET_PORT.to_string()
}

/// The canvas serializes unnamed handles as `null`; treat those like a
/// missing field.
mod port_or_default {
  use serde::{Deserialize, Deserializer};

  pub fn source<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(super::default_source_port))
  }

  pub fn target<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(super::default_target_port))
  }
}
