use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::status::RunStatus;

/// Handle to a submitted task run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
  /// Run identifier assigned by the task system.
  pub run_id: String,
  /// Name of the task that was submitted.
  pub task_name: String,
}

/// A point-in-time view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
  pub status: RunStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl TaskSnapshot {
  pub fn new(status: RunStatus) -> Self {
    Self {
      status,
      output: None,
      error: None,
    }
  }
}

/// The external task system.
///
/// Constructed once by the caller and shared (behind an `Arc`) with every
/// node that needs it.
#[async_trait]
pub trait TaskClient: Send + Sync {
  /// Submit a task run.
  async fn submit(
    &self,
    task_name: &str,
    payload: serde_json::Value,
  ) -> Result<TaskHandle, TaskError>;

  /// Read the current status of a run.
  async fn poll_status(&self, handle: &TaskHandle) -> Result<TaskSnapshot, TaskError>;
}
