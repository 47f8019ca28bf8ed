use std::collections::HashMap;

use crate::node::{Edge, Node};

/// Graph structure for traversal and analysis.
///
/// Adjacency is recorded once per edge, so two edges between the same pair
/// of nodes appear twice in both directions.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in payload order.
  order: Vec<String>,
  /// Adjacency list: node_id -> list of downstream node_ids.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> list of upstream node_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all nodes
    for node in nodes {
      adjacency.entry(node.id.clone()).or_default();
      reverse_adjacency.entry(node.id.clone()).or_default();
    }

    // Build adjacency lists
    for edge in edges {
      adjacency
        .entry(edge.source_node_id.clone())
        .or_default()
        .push(edge.target_node_id.clone());
      reverse_adjacency
        .entry(edge.target_node_id.clone())
        .or_default()
        .push(edge.source_node_id.clone());
    }

    Self {
      order: nodes.iter().map(|n| n.id.clone()).collect(),
      adjacency,
      reverse_adjacency,
    }
  }

  /// Node ids in payload order.
  pub fn node_ids(&self) -> &[String] {
    &self.order
  }

  /// Get downstream nodes for a given node, one entry per edge.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node, one entry per edge.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Number of incoming edges.
  pub fn in_degree(&self, node_id: &str) -> usize {
    self.upstream(node_id).len()
  }

  /// Nodes with no incoming edges, in payload order.
  pub fn entry_points(&self) -> Vec<&str> {
    self
      .order
      .iter()
      .filter(|id| self.in_degree(id) == 0)
      .map(String::as_str)
      .collect()
  }
}
