//! Reading node parameters from a port or, failing that, the node's
//! configuration.

use weaver_task::{TaskState, run_task};
use weaver_workflow::Node;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::inputs::NodeInputs;

/// A non-empty string from `port`, else from configuration `key`.
pub(crate) fn string_param<'a>(
  node: &'a Node,
  inputs: &'a NodeInputs,
  port: &str,
  key: &str,
) -> Option<&'a str> {
  inputs.get_str(port).or_else(|| node.config_str(key))
}

/// A raw value from `port`, else from configuration `key`. `null` and empty
/// strings count as absent.
pub(crate) fn value_param<'a>(
  node: &'a Node,
  inputs: &'a NodeInputs,
  port: &str,
  key: &str,
) -> Option<&'a serde_json::Value> {
  let present = |v: &&serde_json::Value| !v.is_null() && v.as_str() != Some("");
  inputs
    .get(port)
    .filter(present)
    .or_else(|| node.config(key).filter(present))
}

/// Interpret a number or numeric string.
pub(crate) fn as_number(name: &str, value: &serde_json::Value) -> Result<f64, NodeError> {
  let number = match value {
    serde_json::Value::Number(n) => n.as_f64(),
    serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  match number {
    Some(n) if n.is_finite() => Ok(n),
    _ => Err(NodeError::InvalidParameter {
      name: name.to_string(),
      message: format!("expected a number, got {}", value),
    }),
  }
}

/// Submit an external task, wait for it, and pull `field` out of its output.
pub(crate) async fn run_external(
  ctx: &NodeContext,
  label: &'static str,
  task_name: &str,
  payload: serde_json::Value,
  field: &str,
) -> Result<serde_json::Value, NodeError> {
  let state = run_task(ctx.tasks(), task_name, payload, ctx.poll())
    .await
    .map_err(|source| NodeError::Task { label, source })?;

  match state {
    TaskState::Succeeded { output } => extract_output(label, output, field),
    TaskState::Failed { status, error } => Err(NodeError::TaskFailed {
      label,
      status,
      error,
    }),
    TaskState::TimedOut { elapsed } => Err(NodeError::TimedOut {
      label,
      elapsed_ms: elapsed.as_millis() as u64,
    }),
    // `run_task` only returns terminal states.
    TaskState::Submitted | TaskState::Polling { .. } => Err(NodeError::TaskRejected {
      label,
      message: "task did not finish".to_string(),
    }),
  }
}

fn extract_output(
  label: &'static str,
  output: Option<serde_json::Value>,
  field: &str,
) -> Result<serde_json::Value, NodeError> {
  let missing = || NodeError::TaskRejected {
    label,
    message: format!("missing {} in task output", field),
  };

  match output {
    Some(serde_json::Value::Object(mut map)) => {
      if map.get("success").and_then(|v| v.as_bool()) == Some(false) {
        let message = map
          .get("error")
          .and_then(|e| e.as_str())
          .unwrap_or("task reported failure")
          .to_string();
        return Err(NodeError::TaskRejected { label, message });
      }
      match map.remove(field) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(missing()),
      }
    }
    // Tasks that return their result directly.
    Some(serde_json::Value::String(value)) => Ok(serde_json::Value::String(value)),
    _ => Err(missing()),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_as_number() {
    assert_eq!(as_number("x", &json!(12.5)).unwrap(), 12.5);
    assert_eq!(as_number("x", &json!(" 40 ")).unwrap(), 40.0);
    let err = as_number("x_percent", &json!("left")).unwrap_err();
    assert_eq!(
      err.to_string(),
      r#"invalid parameter x_percent: expected a number, got "left""#
    );
    assert!(as_number("x", &json!(true)).is_err());
  }

  #[test]
  fn test_extract_output_field() {
    let value = extract_output("Crop", Some(json!({ "croppedUrl": "c.png" })), "croppedUrl");
    assert_eq!(value.unwrap(), json!("c.png"));
  }

  #[test]
  fn test_extract_output_reported_failure() {
    let err = extract_output(
      "Crop",
      Some(json!({ "success": false, "error": "fetch failed" })),
      "croppedUrl",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Crop failed: fetch failed");
  }

  #[test]
  fn test_extract_output_missing_field() {
    let err = extract_output("Frame extraction", Some(json!({ "success": true })), "frameUrl")
      .unwrap_err();
    assert_eq!(
      err.to_string(),
      "Frame extraction failed: missing frameUrl in task output"
    );

    let err = extract_output("Frame extraction", None, "frameUrl").unwrap_err();
    assert!(err.to_string().contains("missing frameUrl"));
  }

  #[test]
  fn test_extract_output_bare_string() {
    let value = extract_output("LLM generation", Some(json!("hi")), "response");
    assert_eq!(value.unwrap(), json!("hi"));
  }
}
