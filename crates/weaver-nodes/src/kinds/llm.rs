use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use weaver_workflow::{IMAGES_PORT, Node};

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;
use crate::params::{run_external, string_param};

const TASK_NAME: &str = "gemini-llm";
const LABEL: &str = "LLM generation";
const OUTPUT_FIELD: &str = "response";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const USER_MESSAGE_PORT: &str = "user_message";
const SYSTEM_PROMPT_PORT: &str = "system_prompt";

/// Generates text with an external LLM task.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmNode;

struct LlmRequest<'a> {
  model: &'a str,
  system_prompt: &'a str,
  user_message: &'a str,
  images: Vec<serde_json::Value>,
}

impl LlmNode {
  fn request<'a>(node: &'a Node, inputs: &'a NodeInputs) -> Result<LlmRequest<'a>, NodeError> {
    let user_message = string_param(node, inputs, USER_MESSAGE_PORT, "userMessage").ok_or_else(
      || NodeError::MissingInput {
        port: USER_MESSAGE_PORT.to_string(),
      },
    )?;

    Ok(LlmRequest {
      model: node.config_str("model").unwrap_or(DEFAULT_MODEL),
      system_prompt: string_param(node, inputs, SYSTEM_PROMPT_PORT, "systemPrompt")
        .unwrap_or_default(),
      user_message,
      images: collect_images(inputs),
    })
  }
}

/// Images from the `images` port followed by numbered ports like `images_1`.
fn collect_images(inputs: &NodeInputs) -> Vec<serde_json::Value> {
  let numbered_prefix = format!("{}_", IMAGES_PORT);
  let mut images = Vec::new();
  let mut push = |value: &serde_json::Value| match value {
    serde_json::Value::Array(items) => images.extend(
      items
        .iter()
        .filter(|v| !v.is_null() && v.as_str() != Some(""))
        .cloned(),
    ),
    serde_json::Value::Null => {}
    serde_json::Value::String(s) if s.is_empty() => {}
    other => images.push(other.clone()),
  };

  if let Some(value) = inputs.get(IMAGES_PORT) {
    push(value);
  }
  for (port, value) in inputs.iter() {
    if port.starts_with(&numbered_prefix) {
      push(value);
    }
  }
  images
}

#[async_trait]
impl NodeHandler for LlmNode {
  fn validate_inputs(&self, node: &Node, inputs: &NodeInputs) -> Result<(), NodeError> {
    Self::request(node, inputs).map(|_| ())
  }

  async fn execute(
    &self,
    ctx: &NodeContext,
    node: &Node,
    inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError> {
    let request = Self::request(node, inputs)?;
    debug!(
      node_id = %node.id,
      model = %request.model,
      images = request.images.len(),
      "llm_request"
    );

    let payload = json!({
      "model": request.model,
      "systemPrompt": request.system_prompt,
      "userMessage": request.user_message,
      "images": request.images,
    });
    run_external(ctx, LABEL, TASK_NAME, payload, OUTPUT_FIELD).await
  }
}

#[cfg(test)]
mod tests {
  use weaver_config::{NodeDef, NodeKind};

  use super::*;

  fn llm(def: NodeDef) -> Node {
    Node::from(def)
  }

  #[test]
  fn test_requires_user_message() {
    let node = llm(NodeDef::new("llm", NodeKind::Llm));
    let err = LlmNode.validate_inputs(&node, &NodeInputs::new()).unwrap_err();
    assert_eq!(err.to_string(), "missing required input: user_message");

    let mut inputs = NodeInputs::new();
    inputs.insert(USER_MESSAGE_PORT, json!(""));
    assert!(LlmNode.validate_inputs(&node, &inputs).is_err());
  }

  #[test]
  fn test_port_wins_over_configuration() {
    let node = llm(
      NodeDef::new("llm", NodeKind::Llm)
        .with_config("userMessage", "from config")
        .with_config("systemPrompt", "be brief")
        .with_config("model", "gemini-2.0-flash"),
    );
    let mut inputs = NodeInputs::new();
    inputs.insert(USER_MESSAGE_PORT, json!("from port"));

    let request = LlmNode::request(&node, &inputs).unwrap();
    assert_eq!(request.user_message, "from port");
    assert_eq!(request.system_prompt, "be brief");
    assert_eq!(request.model, "gemini-2.0-flash");
  }

  #[test]
  fn test_defaults() {
    let node = llm(NodeDef::new("llm", NodeKind::Llm).with_config("userMessage", "hi"));
    let inputs = NodeInputs::new();
    let request = LlmNode::request(&node, &inputs).unwrap();
    assert_eq!(request.model, DEFAULT_MODEL);
    assert_eq!(request.system_prompt, "");
    assert!(request.images.is_empty());
  }

  #[test]
  fn test_collect_images() {
    let mut inputs = NodeInputs::new();
    inputs.append(IMAGES_PORT, json!("a.png"));
    inputs.append(IMAGES_PORT, json!("b.png"));
    inputs.insert("images_2", json!("d.png"));
    inputs.insert("images_1", json!("c.png"));
    inputs.insert("image_url", json!("ignored.png"));

    assert_eq!(
      collect_images(&inputs),
      vec![json!("a.png"), json!("b.png"), json!("c.png"), json!("d.png")]
    );
  }

  #[test]
  fn test_single_image_promoted() {
    let mut inputs = NodeInputs::new();
    inputs.insert(IMAGES_PORT, json!("a.png"));
    assert_eq!(collect_images(&inputs), vec![json!("a.png")]);
  }
}
