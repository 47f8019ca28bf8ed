use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// A workflow graph payload.
///
/// `nodes` is required; a payload without it fails to deserialize, which
/// callers report as a validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub workflow_id: Option<String>,
  #[serde(default)]
  pub name: String,
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::NodeKind;

  #[test]
  fn test_parse_canvas_payload() {
    let def: WorkflowDef = serde_json::from_str(
      r#"{
        "workflowId": "wf-1",
        "nodes": [
          {"id": "t", "type": "text", "data": {"text": "hello"}},
          {"id": "l", "kind": "llm", "configuration": {"model": "gemini-1.5-pro"}}
        ],
        "edges": [
          {"id": "e", "source": "t", "target": "l", "targetHandle": "user_message"}
        ]
      }"#,
    )
    .unwrap();

    assert_eq!(def.workflow_id.as_deref(), Some("wf-1"));
    assert_eq!(def.nodes[0].kind, NodeKind::Text);
    assert_eq!(def.nodes[0].configuration["text"], "hello");
    assert_eq!(def.nodes[1].kind, NodeKind::Llm);
    assert_eq!(def.edges[0].target_port, "user_message");
  }

  #[test]
  fn test_nodes_are_required() {
    let result = serde_json::from_str::<WorkflowDef>(r#"{"edges": []}"#);
    assert!(result.is_err());
  }

  #[test]
  fn test_edges_default_to_empty() {
    let def: WorkflowDef = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
    assert!(def.edges.is_empty());
  }
}
