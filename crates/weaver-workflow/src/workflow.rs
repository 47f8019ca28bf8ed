use std::collections::HashMap;

use weaver_config::WorkflowDef;

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::node::{Edge, Node};

/// The one input port that collects several edges into an ordered list.
pub const IMAGES_PORT: &str = "images";

/// A validated workflow ready for planning and execution.
///
/// Node order is preserved from the payload; it only matters for
/// deterministic ordering inside a wave.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
  workflow_id: Option<String>,
  name: String,
  nodes: Vec<Node>,
  edges: Vec<Edge>,
  index: HashMap<String, usize>,
}

impl Workflow {
  /// Build a workflow, checking its structure.
  ///
  /// Cycles are not rejected here; see [`crate::has_cycle`].
  pub fn new(
    workflow_id: Option<String>,
    name: impl Into<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
  ) -> Result<Self, WorkflowError> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (position, node) in nodes.iter().enumerate() {
      if index.insert(node.id.clone(), position).is_some() {
        return Err(WorkflowError::DuplicateNode(node.id.clone()));
      }
    }

    let mut edges = edges;
    for (position, edge) in edges.iter_mut().enumerate() {
      if edge.id.is_empty() {
        edge.id = format!("edge-{}", position);
      }
      if !index.contains_key(&edge.source_node_id) || !index.contains_key(&edge.target_node_id) {
        return Err(WorkflowError::InvalidEdge {
          edge_id: edge.id.clone(),
          from: edge.source_node_id.clone(),
          to: edge.target_node_id.clone(),
        });
      }
    }

    let mut bindings: HashMap<(&str, &str), &str> = HashMap::new();
    for edge in &edges {
      if edge.target_port == IMAGES_PORT {
        continue;
      }
      let key = (edge.target_node_id.as_str(), edge.target_port.as_str());
      if let Some(first) = bindings.insert(key, edge.id.as_str()) {
        return Err(WorkflowError::DuplicatePortBinding {
          node_id: edge.target_node_id.clone(),
          port: edge.target_port.clone(),
          first: first.to_string(),
          second: edge.id.clone(),
        });
      }
    }

    Ok(Self {
      workflow_id,
      name: name.into(),
      nodes,
      edges,
      index,
    })
  }

  /// Parse and validate a JSON payload.
  pub fn from_json(payload: &str) -> Result<Self, WorkflowError> {
    let def: WorkflowDef = serde_json::from_str(payload)?;
    Self::try_from(def)
  }

  pub fn workflow_id(&self) -> Option<&str> {
    self.workflow_id.as_deref()
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  /// Get a node by ID.
  pub fn node(&self, node_id: &str) -> Option<&Node> {
    self.index.get(node_id).map(|&i| &self.nodes[i])
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.index.contains_key(node_id)
  }

  /// Position of a node in payload order.
  pub fn position(&self, node_id: &str) -> Option<usize> {
    self.index.get(node_id).copied()
  }

  /// Edges targeting a node, in edge iteration order.
  pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
    self
      .edges
      .iter()
      .filter(move |edge| edge.target_node_id == node_id)
  }

  /// Build the graph structure for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.nodes, &self.edges)
  }

  /// Replace a node's cached output.
  pub fn set_last_output(
    &mut self,
    node_id: &str,
    output: Option<serde_json::Value>,
  ) -> Result<(), WorkflowError> {
    let position = self
      .position(node_id)
      .ok_or_else(|| WorkflowError::NodeNotFound(node_id.to_string()))?;
    self.nodes[position].last_output = output;
    Ok(())
  }

  /// Convert back into a payload, e.g. to save cached outputs.
  pub fn to_def(&self) -> WorkflowDef {
    WorkflowDef {
      workflow_id: self.workflow_id.clone(),
      name: self.name.clone(),
      nodes: self.nodes.iter().cloned().map(Into::into).collect(),
      edges: self.edges.iter().cloned().map(Into::into).collect(),
    }
  }
}

impl TryFrom<WorkflowDef> for Workflow {
  type Error = WorkflowError;

  fn try_from(def: WorkflowDef) -> Result<Self, Self::Error> {
    Workflow::new(
      def.workflow_id,
      def.name,
      def.nodes.into_iter().map(Node::from).collect(),
      def.edges.into_iter().map(Edge::from).collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use weaver_config::{EdgeDef, NodeDef, NodeKind};

  use super::*;

  fn def(nodes: &[&str], edges: &[(&str, &str, &str)]) -> WorkflowDef {
    WorkflowDef {
      workflow_id: None,
      name: "test".to_string(),
      nodes: nodes
        .iter()
        .map(|id| NodeDef::new(*id, NodeKind::Text))
        .collect(),
      edges: edges
        .iter()
        .map(|(from, to, port)| EdgeDef::new("", *from, "output", *to, *port))
        .collect(),
    }
  }

  #[test]
  fn test_valid_workflow() {
    let workflow = Workflow::try_from(def(&["a", "b"], &[("a", "b", "input")])).unwrap();
    assert_eq!(workflow.nodes().len(), 2);
    assert_eq!(workflow.edges()[0].id, "edge-0");
    assert_eq!(workflow.incoming("b").count(), 1);
    assert_eq!(workflow.incoming("a").count(), 0);
  }

  #[test]
  fn test_duplicate_node() {
    let err = Workflow::try_from(def(&["a", "a"], &[])).unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateNode(id) if id == "a"));
  }

  #[test]
  fn test_edge_to_unknown_node() {
    let err = Workflow::try_from(def(&["a"], &[("a", "ghost", "input")])).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidEdge { to, .. } if to == "ghost"));
  }

  #[test]
  fn test_duplicate_port_binding() {
    let err = Workflow::try_from(def(
      &["a", "b", "c"],
      &[("a", "c", "user_message"), ("b", "c", "user_message")],
    ))
    .unwrap_err();
    assert!(matches!(
      err,
      WorkflowError::DuplicatePortBinding { node_id, port, .. } if node_id == "c" && port == "user_message"
    ));
  }

  #[test]
  fn test_images_port_accepts_many_edges() {
    let workflow = Workflow::try_from(def(
      &["a", "b", "c"],
      &[("a", "c", "images"), ("b", "c", "images")],
    ))
    .unwrap();
    assert_eq!(workflow.incoming("c").count(), 2);
  }

  #[test]
  fn test_set_last_output() {
    let mut workflow = Workflow::try_from(def(&["a"], &[])).unwrap();
    workflow
      .set_last_output("a", Some(serde_json::json!("cached")))
      .unwrap();
    assert_eq!(
      workflow.node("a").unwrap().last_output,
      Some(serde_json::json!("cached"))
    );
    assert!(workflow.set_last_output("missing", None).is_err());
    assert_eq!(
      workflow.to_def().nodes[0].last_output,
      Some(serde_json::json!("cached"))
    );
  }

  #[test]
  fn test_from_json_rejects_missing_nodes() {
    let err = Workflow::from_json(r#"{"edges": []}"#).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidPayload(_)));
  }
}
