use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use weaver_config::NodeKind;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;
use crate::kinds::{CropImageNode, ExtractFrameNode, LlmNode, TextNode, UploadNode};

static TEXT: TextNode = TextNode;
static UPLOAD_IMAGE: UploadNode = UploadNode::IMAGE;
static UPLOAD_VIDEO: UploadNode = UploadNode::VIDEO;
static LLM: LlmNode = LlmNode;
static CROP_IMAGE: CropImageNode = CropImageNode;
static EXTRACT_FRAME: ExtractFrameNode = ExtractFrameNode;

/// Handler for a node kind, or `None` for kinds this build doesn't know.
pub fn handler_for(kind: &NodeKind) -> Option<&'static dyn NodeHandler> {
  match kind {
    NodeKind::Text => Some(&TEXT),
    NodeKind::UploadImage => Some(&UPLOAD_IMAGE),
    NodeKind::UploadVideo => Some(&UPLOAD_VIDEO),
    NodeKind::Llm => Some(&LLM),
    NodeKind::CropImage => Some(&CROP_IMAGE),
    NodeKind::ExtractFrame => Some(&EXTRACT_FRAME),
    NodeKind::Unknown(_) => None,
  }
}

/// Result of executing one node. Exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutcome {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl NodeOutcome {
  pub fn success(output: serde_json::Value) -> Self {
    Self {
      output: Some(output),
      error: None,
    }
  }

  pub fn failure(error: impl Into<String>) -> Self {
    Self {
      output: None,
      error: Some(error.into()),
    }
  }

  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }
}

impl From<Result<serde_json::Value, NodeError>> for NodeOutcome {
  fn from(result: Result<serde_json::Value, NodeError>) -> Self {
    match result {
      Ok(output) => NodeOutcome::success(output),
      Err(e) => NodeOutcome::failure(e.to_string()),
    }
  }
}

/// Validate and execute one node. Handler failures become the outcome's
/// error message.
pub async fn execute_node(ctx: &NodeContext, node: &Node, inputs: NodeInputs) -> NodeOutcome {
  let start = Instant::now();
  let result = run_handler(ctx, node, &inputs).await;
  let duration_ms = start.elapsed().as_millis() as u64;

  match &result {
    Ok(_) => debug!(node_id = %node.id, kind = %node.kind, duration_ms, "node_executed"),
    Err(e) => warn!(node_id = %node.id, kind = %node.kind, error = %e, duration_ms, "node_errored"),
  }

  result.into()
}

async fn run_handler(
  ctx: &NodeContext,
  node: &Node,
  inputs: &NodeInputs,
) -> Result<serde_json::Value, NodeError> {
  let handler =
    handler_for(&node.kind).ok_or_else(|| NodeError::UnknownKind(node.kind.to_string()))?;
  handler.validate_inputs(node, inputs)?;
  handler.execute(ctx, node, inputs).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_every_known_kind_has_a_handler() {
    for tag in [
      "text",
      "upload-image",
      "upload-video",
      "llm",
      "crop-image",
      "extract-frame",
    ] {
      let Ok(kind) = tag.parse::<NodeKind>();
      assert!(handler_for(&kind).is_some(), "no handler for {}", tag);
    }
    assert!(handler_for(&NodeKind::Unknown("webhook".to_string())).is_none());
  }

  #[test]
  fn test_outcome_from_result() {
    let outcome = NodeOutcome::from(Ok(serde_json::json!("hi")));
    assert!(outcome.is_success());
    assert_eq!(outcome.output, Some(serde_json::json!("hi")));

    let outcome = NodeOutcome::from(Err(NodeError::NoImage));
    assert!(!outcome.is_success());
    assert_eq!(outcome.error.as_deref(), Some("no image"));
    assert!(outcome.output.is_none());
  }
}
