use thiserror::Error;
use weaver_task::{RunStatus, TaskError};

/// Why a node produced no output.
///
/// Rendered with `to_string()` into the node's result; callers match on the
/// message text, not on the variant.
#[derive(Debug, Error)]
pub enum NodeError {
  /// A port the node needs was not fed by any completed upstream node.
  #[error("missing required input: {port}")]
  MissingInput { port: String },

  /// An upload node has no media reference.
  #[error("no file")]
  NoFile,

  #[error("no image")]
  NoImage,

  #[error("no video")]
  NoVideo,

  #[error("invalid parameter {name}: {message}")]
  InvalidParameter { name: String, message: String },

  /// The external task ended in a terminal status other than success.
  #[error(
    "{label} failed: {status}{}",
    .error.as_ref().map(|e| format!(" ({})", e)).unwrap_or_default()
  )]
  TaskFailed {
    label: &'static str,
    status: RunStatus,
    error: Option<String>,
  },

  /// The external task completed but reported a failure in its output.
  #[error("{label} failed: {message}")]
  TaskRejected { label: &'static str, message: String },

  #[error("{label} timed out after {elapsed_ms}ms")]
  TimedOut { label: &'static str, elapsed_ms: u64 },

  /// The task system could not be reached.
  #[error("{label} failed: {source}")]
  Task {
    label: &'static str,
    #[source]
    source: TaskError,
  },

  #[error("unknown node type: {0}")]
  UnknownKind(String),
}
