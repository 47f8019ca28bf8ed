use async_trait::async_trait;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;

/// Passes through the media reference an upload left in the node's
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct UploadNode {
  key: &'static str,
}

impl UploadNode {
  pub const IMAGE: UploadNode = UploadNode { key: "imageUrl" };
  pub const VIDEO: UploadNode = UploadNode { key: "videoUrl" };

  fn reference<'a>(&self, node: &'a Node) -> Result<&'a str, NodeError> {
    node.config_str(self.key).ok_or(NodeError::NoFile)
  }
}

#[async_trait]
impl NodeHandler for UploadNode {
  fn validate_inputs(&self, node: &Node, _inputs: &NodeInputs) -> Result<(), NodeError> {
    self.reference(node).map(|_| ())
  }

  async fn execute(
    &self,
    _ctx: &NodeContext,
    node: &Node,
    _inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError> {
    Ok(serde_json::Value::String(self.reference(node)?.to_string()))
  }
}
