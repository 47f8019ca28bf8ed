use async_trait::async_trait;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::inputs::NodeInputs;

/// Behavior of one node kind.
#[async_trait]
pub trait NodeHandler: Send + Sync {
  /// Check that the node has everything it needs before any work starts.
  fn validate_inputs(&self, node: &Node, inputs: &NodeInputs) -> Result<(), NodeError>;

  /// Produce the node's output value.
  ///
  /// Only called after `validate_inputs` succeeded for the same inputs.
  async fn execute(
    &self,
    ctx: &NodeContext,
    node: &Node,
    inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError>;
}
