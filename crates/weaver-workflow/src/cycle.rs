//! Cycle detection.
//!
//! Depth-first walk from every unvisited node (in payload order), keeping the
//! set of nodes on the current path. An edge into a node on the path is a back
//! edge, which means the graph has a cycle. The walk keeps its own stack so a
//! long chain of nodes can't overflow the thread stack.

use std::collections::HashSet;

use crate::workflow::Workflow;

/// Returns true if the workflow graph contains a cycle.
pub fn has_cycle(workflow: &Workflow) -> bool {
  find_cycle(workflow).is_some()
}

/// Returns the first back edge `(from, to)` found, if any.
pub fn find_cycle(workflow: &Workflow) -> Option<(String, String)> {
  let graph = workflow.graph();
  let mut visited: HashSet<&str> = HashSet::new();
  let mut on_stack: HashSet<&str> = HashSet::new();

  for root in graph.node_ids() {
    if !visited.insert(root.as_str()) {
      continue;
    }
    on_stack.insert(root.as_str());

    // (node, index of the next outgoing edge to follow)
    let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];

    while let Some(frame) = stack.last_mut() {
      let (node, next) = *frame;
      let children = graph.downstream(node);

      if next < children.len() {
        frame.1 += 1;
        let child = children[next].as_str();
        if on_stack.contains(child) {
          return Some((node.to_string(), child.to_string()));
        }
        if visited.insert(child) {
          on_stack.insert(child);
          stack.push((child, 0));
        }
      } else {
        on_stack.remove(node);
        stack.pop();
      }
    }
  }

  None
}

#[cfg(test)]
mod tests {
  use weaver_config::NodeKind;

  use super::*;
  use crate::node::{Edge, Node};

  fn workflow(nodes: &[&str], edges: &[(&str, &str)]) -> Workflow {
    let nodes = nodes
      .iter()
      .map(|id| Node {
        id: id.to_string(),
        kind: NodeKind::Text,
        configuration: Default::default(),
        last_output: None,
      })
      .collect();
    // Distinct ports so parallel edges don't trip the port binding check.
    let edges = edges
      .iter()
      .enumerate()
      .map(|(i, (from, to))| Edge {
        id: format!("e{}", i),
        source_node_id: from.to_string(),
        source_port: "output".to_string(),
        target_node_id: to.to_string(),
        target_port: format!("in{}", i),
      })
      .collect();
    Workflow::new(None, "test", nodes, edges).unwrap()
  }

  #[test]
  fn test_two_node_cycle() {
    let wf = workflow(&["a", "b"], &[("a", "b"), ("b", "a")]);
    assert!(has_cycle(&wf));
    assert_eq!(find_cycle(&wf), Some(("b".to_string(), "a".to_string())));
  }

  #[test]
  fn test_self_loop() {
    let wf = workflow(&["a"], &[("a", "a")]);
    assert!(has_cycle(&wf));
  }

  #[test]
  fn test_chain_is_acyclic() {
    let wf = workflow(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
    assert!(!has_cycle(&wf));
  }

  #[test]
  fn test_diamond_is_acyclic() {
    // Reaching d twice through different paths is not a back edge.
    let wf = workflow(
      &["a", "b", "c", "d"],
      &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
    );
    assert!(!has_cycle(&wf));
  }

  #[test]
  fn test_cycle_in_second_component() {
    let wf = workflow(
      &["a", "b", "x", "y", "z"],
      &[("a", "b"), ("x", "y"), ("y", "z"), ("z", "x")],
    );
    assert!(has_cycle(&wf));
  }

  #[test]
  fn test_cycle_listed_against_edge_order() {
    let wf = workflow(&["a", "b", "c"], &[("b", "a"), ("c", "b"), ("a", "c")]);
    assert!(has_cycle(&wf));
  }

  #[test]
  fn test_long_chain_does_not_overflow() {
    let ids: Vec<String> = (0..20_000).map(|i| format!("n{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let edges: Vec<(&str, &str)> = id_refs.windows(2).map(|w| (w[0], w[1])).collect();
    let wf = workflow(&id_refs, &edges);
    assert!(!has_cycle(&wf));
  }
}
