//! Engine-level failures.
//!
//! A node that fails is not an engine error; its message lands in that node's
//! result and the run carries on. These errors end the whole run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
  /// The graph contains a cycle, found through the edge `from -> to`.
  #[error("workflow contains a cycle through edge '{from}' -> '{to}'")]
  Cycle { from: String, to: String },

  /// A run scope names a node the workflow doesn't have.
  #[error("node '{0}' not found in workflow")]
  UnknownNode(String),

  /// A spawned node task panicked or was aborted.
  #[error("node '{node_id}' did not complete: {message}")]
  Join { node_id: String, message: String },

  #[error("workflow execution cancelled")]
  Cancelled,
}
