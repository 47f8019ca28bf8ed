use serde::{Deserialize, Serialize};
use weaver_config::{EdgeDef, NodeDef, NodeKind};

/// A node in a validated workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
  pub id: String,
  pub kind: NodeKind,
  pub configuration: serde_json::Map<String, serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_output: Option<serde_json::Value>,
}

impl Node {
  /// Raw configuration value.
  pub fn config(&self, key: &str) -> Option<&serde_json::Value> {
    self.configuration.get(key)
  }

  /// Configuration value as a string, treating `null` and empty strings as
  /// absent.
  pub fn config_str(&self, key: &str) -> Option<&str> {
    self
      .configuration
      .get(key)
      .and_then(|v| v.as_str())
      .filter(|s| !s.is_empty())
  }
}

impl From<NodeDef> for Node {
  fn from(def: NodeDef) -> Self {
    Self {
      id: def.id,
      kind: def.kind,
      configuration: def.configuration,
      last_output: def.last_output,
    }
  }
}

impl From<Node> for NodeDef {
  fn from(node: Node) -> Self {
    Self {
      id: node.id,
      kind: node.kind,
      configuration: node.configuration,
      last_output: node.last_output,
    }
  }
}

/// A directed edge between two nodes of the same workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
  pub id: String,
  pub source_node_id: String,
  pub source_port: String,
  pub target_node_id: String,
  pub target_port: String,
}

impl From<EdgeDef> for Edge {
  fn from(def: EdgeDef) -> Self {
    Self {
      id: def.id,
      source_node_id: def.source_node_id,
      source_port: def.source_port,
      target_node_id: def.target_node_id,
      target_port: def.target_port,
    }
  }
}

impl From<Edge> for EdgeDef {
  fn from(edge: Edge) -> Self {
    Self {
      id: edge.id,
      source_node_id: edge.source_node_id,
      source_port: edge.source_port,
      target_node_id: edge.target_node_id,
      target_port: edge.target_port,
    }
  }
}
