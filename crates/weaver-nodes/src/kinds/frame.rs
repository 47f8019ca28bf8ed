use std::fmt;

use async_trait::async_trait;
use serde_json::json;
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::handler::NodeHandler;
use crate::inputs::NodeInputs;
use crate::params::{as_number, run_external, string_param, value_param};

const TASK_NAME: &str = "extract-frame";
const LABEL: &str = "Frame extraction";
const OUTPUT_FIELD: &str = "frameUrl";

const VIDEO_PORT: &str = "video_url";
const TIMESTAMP_PORT: &str = "timestamp";

/// Where in a video to take a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTimestamp {
  /// Fraction of the video's duration, `0..=100`.
  Percent(f64),
  /// Offset from the start.
  Seconds(f64),
}

impl Default for FrameTimestamp {
  fn default() -> Self {
    FrameTimestamp::Percent(50.0)
  }
}

impl fmt::Display for FrameTimestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FrameTimestamp::Percent(p) => write!(f, "{}%", p),
      FrameTimestamp::Seconds(s) => write!(f, "{}s", s),
    }
  }
}

impl FrameTimestamp {
  /// Accepts `"25%"`, a number of seconds, or a numeric string of seconds.
  pub fn parse(value: &serde_json::Value) -> Result<Self, NodeError> {
    let invalid = |message: String| NodeError::InvalidParameter {
      name: TIMESTAMP_PORT.to_string(),
      message,
    };

    if let Some(percent) = value.as_str().and_then(|s| s.trim().strip_suffix('%')) {
      let percent = percent
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| invalid(format!("expected a percentage, got {}", value)))?;
      if !(0.0..=100.0).contains(&percent) {
        return Err(invalid(format!("{}% is outside 0..=100", percent)));
      }
      return Ok(FrameTimestamp::Percent(percent));
    }

    let seconds = as_number(TIMESTAMP_PORT, value)?;
    if seconds < 0.0 {
      return Err(invalid(format!("{} is negative", seconds)));
    }
    Ok(FrameTimestamp::Seconds(seconds))
  }

  /// Form the extraction task expects.
  pub fn to_payload(self) -> serde_json::Value {
    match self {
      FrameTimestamp::Percent(p) => json!(format!("{}%", p)),
      FrameTimestamp::Seconds(s) => json!(s),
    }
  }
}

/// Pulls a single frame out of a video with an external task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractFrameNode;

impl ExtractFrameNode {
  fn request<'a>(
    node: &'a Node,
    inputs: &'a NodeInputs,
  ) -> Result<(&'a str, FrameTimestamp), NodeError> {
    let video = string_param(node, inputs, VIDEO_PORT, "videoUrl").ok_or(NodeError::NoVideo)?;
    let timestamp = match value_param(node, inputs, TIMESTAMP_PORT, "timestamp") {
      Some(value) => FrameTimestamp::parse(value)?,
      None => FrameTimestamp::default(),
    };
    Ok((video, timestamp))
  }
}

#[async_trait]
impl NodeHandler for ExtractFrameNode {
  fn validate_inputs(&self, node: &Node, inputs: &NodeInputs) -> Result<(), NodeError> {
    Self::request(node, inputs).map(|_| ())
  }

  async fn execute(
    &self,
    ctx: &NodeContext,
    node: &Node,
    inputs: &NodeInputs,
  ) -> Result<serde_json::Value, NodeError> {
    let (video, timestamp) = Self::request(node, inputs)?;
    let payload = json!({
      "videoUrl": video,
      "timestamp": timestamp.to_payload(),
    });
    run_external(ctx, LABEL, TASK_NAME, payload, OUTPUT_FIELD).await
  }
}

#[cfg(test)]
mod tests {
  use weaver_config::{NodeDef, NodeKind};

  use super::*;

  #[test]
  fn test_parse_timestamps() {
    assert_eq!(
      FrameTimestamp::parse(&json!("25%")).unwrap(),
      FrameTimestamp::Percent(25.0)
    );
    assert_eq!(
      FrameTimestamp::parse(&json!(" 12.5 % ")).unwrap(),
      FrameTimestamp::Percent(12.5)
    );
    assert_eq!(
      FrameTimestamp::parse(&json!(3)).unwrap(),
      FrameTimestamp::Seconds(3.0)
    );
    assert_eq!(
      FrameTimestamp::parse(&json!("1.5")).unwrap(),
      FrameTimestamp::Seconds(1.5)
    );
  }

  #[test]
  fn test_reject_bad_timestamps() {
    assert!(FrameTimestamp::parse(&json!("150%")).is_err());
    assert!(FrameTimestamp::parse(&json!("half%")).is_err());
    assert!(FrameTimestamp::parse(&json!(-2)).is_err());
    assert!(FrameTimestamp::parse(&json!("soon")).is_err());
  }

  #[test]
  fn test_payload_form() {
    assert_eq!(FrameTimestamp::Percent(50.0).to_payload(), json!("50%"));
    assert_eq!(FrameTimestamp::Seconds(2.5).to_payload(), json!(2.5));
  }

  #[test]
  fn test_no_video() {
    let node = Node::from(NodeDef::new("frame", NodeKind::ExtractFrame));
    let err = ExtractFrameNode
      .validate_inputs(&node, &NodeInputs::new())
      .unwrap_err();
    assert_eq!(err.to_string(), "no video");
  }

  #[test]
  fn test_default_timestamp() {
    let node = Node::from(
      NodeDef::new("frame", NodeKind::ExtractFrame).with_config("videoUrl", "https://cdn/v.mp4"),
    );
    let inputs = NodeInputs::new();
    let (video, timestamp) = ExtractFrameNode::request(&node, &inputs).unwrap();
    assert_eq!(video, "https://cdn/v.mp4");
    assert_eq!(timestamp, FrameTimestamp::Percent(50.0));
  }
}
