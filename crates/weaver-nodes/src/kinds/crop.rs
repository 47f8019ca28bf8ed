use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;
use crate::params::{as_number, run_external, string_param, value_param};

const TASK_NAME: &str = "crop-image";
const LABEL: &str = "Crop";
const OUTPUT_FIELD: &str = "croppedUrl";

const IMAGE_PORT: &str = "image_url";

/// Crop rectangle in percent of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRegion {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl Default for CropRegion {
  fn default() -> Self {
    Self {
      x: 0.0,
      y: 0.0,
      width: 100.0,
      height: 100.0,
    }
  }
}

impl CropRegion {
  /// Read the four percentages from ports, then configuration, then defaults.
  pub fn from_node(node: &Node, inputs: &NodeInputs) -> Result<Self, NodeError> {
    let defaults = Self::default();
    Ok(Self {
      x: percent(node, inputs, "x_percent", "xPercent", defaults.x)?,
      y: percent(node, inputs, "y_percent", "yPercent", defaults.y)?,
      width: extent(node, inputs, "width_percent", "widthPercent", defaults.width)?,
      height: extent(node, inputs, "height_percent", "heightPercent", defaults.height)?,
    })
  }
}

fn percent(
  node: &Node,
  inputs: &NodeInputs,
  port: &str,
  key: &str,
  default: f64,
) -> Result<f64, NodeError> {
  let value = match value_param(node, inputs, port, key) {
    Some(value) => as_number(port, value)?,
    None => return Ok(default),
  };
  if !(0.0..=100.0).contains(&value) {
    return Err(NodeError::InvalidParameter {
      name: port.to_string(),
      message: format!("{} is outside 0..=100", value),
    });
  }
  Ok(value)
}

/// Like [`percent`], but a zero-sized crop is rejected.
fn extent(
  node: &Node,
  inputs: &NodeInputs,
  port: &str,
  key: &str,
  default: f64,
) -> Result<f64, NodeError> {
  let value = percent(node, inputs, port, key, default)?;
  if value == 0.0 {
    return Err(NodeError::InvalidParameter {
      name: port.to_string(),
      message: "must be greater than 0".to_string(),
    });
  }
  Ok(value)
}

/// Crops an image with an external task.
#[derive(Debug, Default, Clone, Copy)]
pub struct CropImageNode;

impl CropImageNode {
  fn request<'a>(
    node: &'a Node,
    inputs: &'a NodeInputs,
  ) -> Result<(&'a str, CropRegion), NodeError> {
    let image = string_param(node, inputs, IMAGE_PORT, "imageUrl").ok_or(NodeError::NoImage)?;
    let region = CropRegion::from_node(node, inputs)?;
    Ok((image, region))
  }
}

#[async_trait]
impl NodeHandler for CropImageNode {
  fn validate_inputs(&self, node: &Node, inputs: &NodeInputs) -> Result<(), NodeError> {
    Self::request(node, inputs).map(|_| ())
  }

  async fn execute(
    &self,
    ctx: &NodeContext,
    node: &Node,
    inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError> {
    let (image, region) = Self::request(node, inputs)?;
    let payload = json!({
      "imageUrl": image,
      "x": region.x,
      "y": region.y,
      "width": region.width,
      "height": region.height,
    });
    run_external(ctx, LABEL, TASK_NAME, payload, OUTPUT_FIELD).await
  }
}
