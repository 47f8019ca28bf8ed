use thiserror::Error;

/// Errors talking to the external task system.
///
/// These are transport or protocol failures. A task that runs and fails is
/// not an error here; it ends in [`crate::TaskState::Failed`].
#[derive(Debug, Error)]
pub enum TaskError {
  /// HTTP request failed.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The task system refused or could not accept the task.
  #[error("failed to submit task '{task_name}': {message}")]
  Submit { task_name: String, message: String },

  /// The status of a run could not be read.
  #[error("failed to poll run '{run_id}': {message}")]
  Poll { run_id: String, message: String },
}
