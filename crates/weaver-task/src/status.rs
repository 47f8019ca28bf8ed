use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a run in the external task system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
  #[serde(alias = "pending", alias = "PENDING_VERSION")]
  Pending,
  #[serde(alias = "queued", alias = "DEQUEUED")]
  Queued,
  #[serde(alias = "running", alias = "RUNNING", alias = "REATTEMPTING", alias = "FROZEN")]
  Executing,
  #[serde(alias = "waiting")]
  Waiting,
  #[serde(alias = "delayed")]
  Delayed,
  #[serde(alias = "succeeded", alias = "SUCCEEDED")]
  Completed,
  #[serde(alias = "failed")]
  Failed,
  #[serde(alias = "canceled", alias = "CANCELLED")]
  Canceled,
  #[serde(alias = "crashed", alias = "INTERRUPTED")]
  Crashed,
  #[serde(alias = "system_failure")]
  SystemFailure,
  #[serde(alias = "timed_out")]
  TimedOut,
  #[serde(alias = "expired")]
  Expired,
}

impl RunStatus {
  /// No further progress is expected from a run in this status.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      RunStatus::Completed
        | RunStatus::Failed
        | RunStatus::Canceled
        | RunStatus::Crashed
        | RunStatus::SystemFailure
        | RunStatus::TimedOut
        | RunStatus::Expired
    )
  }

  pub fn is_success(&self) -> bool {
    matches!(self, RunStatus::Completed)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RunStatus::Pending => "PENDING",
      RunStatus::Queued => "QUEUED",
      RunStatus::Executing => "EXECUTING",
      RunStatus::Waiting => "WAITING",
      RunStatus::Delayed => "DELAYED",
      RunStatus::Completed => "COMPLETED",
      RunStatus::Failed => "FAILED",
      RunStatus::Canceled => "CANCELED",
      RunStatus::Crashed => "CRASHED",
      RunStatus::SystemFailure => "SYSTEM_FAILURE",
      RunStatus::TimedOut => "TIMED_OUT",
      RunStatus::Expired => "EXPIRED",
    }
  }
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
