use async_trait::async_trait;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;

const TEXT_KEY: &str = "text";

/// Emits its configured text. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNode;

#[async_trait]
impl NodeHandler for TextNode {
  fn validate_inputs(&self, _node: &Node, _inputs: &NodeInputs) -> Result<(), NodeError> {
    Ok(())
  }

  async fn execute(
    &self,
    _ctx: &NodeContext,
    node: &Node,
    _inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError> {
    let text = node
      .config(TEXT_KEY)
      .and_then(|v| v.as_str())
      .unwrap_or_default();
    Ok(serde_json::Value::String(text.to_string()))
  }
}
