//! Wave planning.
//!
//! A wave is a group of nodes whose inputs are all produced by earlier waves,
//! so its nodes can run concurrently. Waves come from a Kahn-style in-degree
//! reduction: every node whose remaining in-degree is zero joins the current
//! wave, then each outgoing edge of those nodes decrements its target by one.

use std::collections::HashMap;

use crate::workflow::Workflow;

/// Node ids that can run together, in payload order.
pub type Wave = Vec<String>;

/// Compute the execution waves of a workflow.
///
/// On a cyclic graph the reduction stalls; the waves computed up to that
/// point are returned and the nodes on or behind the cycle are left out.
/// Run [`crate::has_cycle`] first to reject such graphs.
pub fn compute_waves(workflow: &Workflow) -> Vec<Wave> {
  let graph = workflow.graph();

  let mut in_degree: HashMap<&str, usize> = graph
    .node_ids()
    .iter()
    .map(|id| (id.as_str(), graph.in_degree(id)))
    .collect();

  let mut remaining: Vec<&str> = graph.node_ids().iter().map(String::as_str).collect();
  let mut waves = Vec::new();

  while !remaining.is_empty() {
    let (ready, blocked): (Vec<&str>, Vec<&str>) = remaining
      .into_iter()
      .partition(|id| in_degree.get(id).copied().unwrap_or(0) == 0);

    if ready.is_empty() {
      break;
    }

    for id in &ready {
      for target in graph.downstream(id) {
        if let Some(degree) = in_degree.get_mut(target.as_str()) {
          *degree = degree.saturating_sub(1);
        }
      }
    }

    waves.push(ready.iter().map(|id| id.to_string()).collect());
    remaining = blocked;
  }

  waves
}

/// Map each planned node to the index of its wave.
pub fn wave_index(waves: &[Wave]) -> HashMap<&str, usize> {
  waves
    .iter()
    .enumerate()
    .flat_map(|(i, wave)| wave.iter().map(move |id| (id.as_str(), i)))
    .collect()
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

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

  fn assert_valid_plan(wf: &Workflow, waves: &[Wave]) {
    let planned: Vec<&str> = waves.iter().flatten().map(String::as_str).collect();
    let unique: HashSet<&str> = planned.iter().copied().collect();
    assert_eq!(planned.len(), unique.len(), "a node appears in two waves");
    assert_eq!(unique.len(), wf.nodes().len(), "a node is missing");

    let index = wave_index(waves);
    for edge in wf.edges() {
      assert!(
        index[edge.source_node_id.as_str()] < index[edge.target_node_id.as_str()],
        "edge {} -> {} is not forward",
        edge.source_node_id,
        edge.target_node_id
      );
    }
  }

  #[test]
  fn test_independent_nodes_form_one_wave() {
    let wf = workflow(&["a", "b", "c"], &[]);
    let waves = compute_waves(&wf);
    assert_eq!(waves, vec![vec!["a", "b", "c"]]);
  }

  #[test]
  fn test_chain_forms_one_wave_per_node() {
    let wf = workflow(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
    let waves = compute_waves(&wf);
    assert_eq!(waves, vec![vec!["a"], vec!["b"], vec!["c"]]);
  }

  #[test]
  fn test_wave_order_follows_payload_order() {
    let wf = workflow(&["c", "a", "b"], &[]);
    assert_eq!(compute_waves(&wf), vec![vec!["c", "a", "b"]]);
  }

  #[test]
  fn test_diamond() {
    let wf = workflow(
      &["a", "b", "c", "d"],
      &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
    );
    let waves = compute_waves(&wf);
    assert_eq!(waves, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    assert_valid_plan(&wf, &waves);
  }

  #[test]
  fn test_parallel_edges_reduce_in_degree_per_edge() {
    // Two edges a -> b; b must wait until both are released.
    let wf = workflow(&["a", "b"], &[("a", "b"), ("a", "b")]);
    let waves = compute_waves(&wf);
    assert_eq!(waves, vec![vec!["a"], vec!["b"]]);
  }

  #[test]
  fn test_uneven_depths() {
    // e depends on a (depth 1) and d (depth 3).
    let wf = workflow(
      &["a", "b", "c", "d", "e"],
      &[("a", "e"), ("b", "c"), ("c", "d"), ("d", "e")],
    );
    let waves = compute_waves(&wf);
    assert_eq!(
      waves,
      vec![vec!["a", "b"], vec!["c"], vec!["d"], vec!["e"]]
    );
    assert_valid_plan(&wf, &waves);
  }

  #[test]
  fn test_cycle_returns_partial_plan() {
    let wf = workflow(&["root", "a", "b"], &[("root", "a"), ("a", "b"), ("b", "a")]);
    let waves = compute_waves(&wf);
    assert_eq!(waves, vec![vec!["root"]]);
  }

  #[test]
  fn test_empty_workflow() {
    let wf = workflow(&[], &[]);
    assert!(compute_waves(&wf).is_empty());
  }

  #[test]
  fn test_layered_graph_plan_is_valid() {
    // Deterministic pseudo-random DAG: edges only go from lower to higher index.
    let ids: Vec<String> = (0..40).map(|i| format!("n{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut edges = Vec::new();
    let mut seed: u64 = 7;
    for i in 0..id_refs.len() {
      for j in (i + 1)..id_refs.len() {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        if seed >> 60 == 0 {
          edges.push((id_refs[i], id_refs[j]));
        }
      }
    }
    let wf = workflow(&id_refs, &edges);
    let waves = compute_waves(&wf);
    assert_valid_plan(&wf, &waves);
  }
}
