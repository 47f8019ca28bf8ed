//! Input resolution.
//!
//! A node's inputs are the outputs of its upstream nodes, keyed by the target
//! port of the connecting edge. The `images` port collects every value routed
//! to it into a list; any other port holds a single value.

use std::collections::HashMap;

use weaver_nodes::NodeInputs;
use weaver_workflow::{IMAGES_PORT, Workflow};

/// Gather the inputs for `node_id` from the outputs produced so far.
///
/// Edges are visited in workflow order. An upstream node with no output
/// leaves its port absent.
pub fn resolve_inputs(
  workflow: &Workflow,
  outputs: &HashMap<String, serde_json::Value>,
  node_id: &str,
) -> NodeInputs {
  let mut inputs = NodeInputs::new();
  for edge in workflow.incoming(node_id) {
    let Some(value) = outputs.get(&edge.source_node_id) else {
      continue;
    };
    if edge.target_port == IMAGES_PORT {
      inputs.append(IMAGES_PORT, value.clone());
    } else {
      inputs.insert(edge.target_port.clone(), value.clone());
    }
  }
  inputs
}
