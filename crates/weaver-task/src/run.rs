//! Waiting for a task run to finish.
//!
//! A run moves through these states:
//!
//! ```text
//! Submitted ──poll──▶ Polling ──poll──▶ Polling ...
//!     │                  │
//!     └──────────────────┴──▶ Succeeded | Failed | TimedOut
//! ```
//!
//! [`TaskRun::step`] performs one transition. [`TaskRun::wait`] repeats it,
//! sleeping `interval` between polls, until the state is terminal. The
//! `timeout` budget is measured from submission and also bounds each call
//! to the task system; once it is spent the run ends in `TimedOut`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::client::{TaskClient, TaskHandle};
use crate::error::TaskError;
use crate::status::RunStatus;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// How often to poll a run and how long to wait for it in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
  #[serde(rename = "pollIntervalMs", with = "millis")]
  pub interval: Duration,
  #[serde(rename = "timeoutMs", with = "millis")]
  pub timeout: Duration,
}

impl PollConfig {
  pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
    Self {
      interval: Duration::from_millis(interval_ms),
      timeout: Duration::from_millis(timeout_ms),
    }
  }
}

impl Default for PollConfig {
  fn default() -> Self {
    Self::from_millis(DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS)
  }
}

mod millis {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    Ok(Duration::from_millis(u64::deserialize(deserializer)?))
  }
}

/// State of a submitted run.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
  /// Accepted by the task system, not polled yet.
  Submitted,
  /// Polled at least once and still in progress.
  Polling { attempts: u32, status: RunStatus },
  /// Finished successfully.
  Succeeded { output: Option<serde_json::Value> },
  /// Finished in any other terminal status.
  Failed {
    status: RunStatus,
    error: Option<String>,
  },
  /// The poll budget ran out before the run finished.
  TimedOut { elapsed: Duration },
}

impl TaskState {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      TaskState::Succeeded { .. } | TaskState::Failed { .. } | TaskState::TimedOut { .. }
    )
  }
}

/// A submitted run and the state it has reached.
#[derive(Debug)]
pub struct TaskRun {
  handle: TaskHandle,
  state: TaskState,
  submitted_at: Instant,
}

impl TaskRun {
  /// Submit a task and return the run in the `Submitted` state.
  pub async fn start(
    client: &dyn TaskClient,
    task_name: &str,
    payload: serde_json::Value,
  ) -> Result<Self, TaskError> {
    let submitted_at = Instant::now();
    let handle = client.submit(task_name, payload).await?;
    debug!(task_name = %task_name, run_id = %handle.run_id, "task_submitted");
    Ok(Self {
      handle,
      state: TaskState::Submitted,
      submitted_at,
    })
  }

  pub fn handle(&self) -> &TaskHandle {
    &self.handle
  }

  pub fn state(&self) -> &TaskState {
    &self.state
  }

  /// Advance by one transition. Terminal states are left unchanged.
  pub async fn step(
    &mut self,
    client: &dyn TaskClient,
    config: &PollConfig,
  ) -> Result<&TaskState, TaskError> {
    if self.state.is_terminal() {
      return Ok(&self.state);
    }

    let remaining = config.timeout.saturating_sub(self.submitted_at.elapsed());
    if remaining.is_zero() {
      return Ok(self.time_out());
    }

    let polled = tokio::time::timeout(remaining, client.poll_status(&self.handle)).await;
    let snapshot = match polled {
      Ok(snapshot) => snapshot?,
      Err(_) => return Ok(self.time_out()),
    };
    let attempts = match self.state {
      TaskState::Polling { attempts, .. } => attempts + 1,
      _ => 1,
    };

    self.state = if snapshot.status.is_success() {
      TaskState::Succeeded {
        output: snapshot.output,
      }
    } else if snapshot.status.is_terminal() {
      TaskState::Failed {
        status: snapshot.status,
        error: snapshot.error,
      }
    } else {
      TaskState::Polling {
        attempts,
        status: snapshot.status,
      }
    };

    debug!(
      run_id = %self.handle.run_id,
      status = %snapshot.status,
      attempts,
      "task_polled"
    );

    Ok(&self.state)
  }

  fn time_out(&mut self) -> &TaskState {
    let elapsed = self.submitted_at.elapsed();
    debug!(run_id = %self.handle.run_id, elapsed_ms = elapsed.as_millis() as u64, "task_timed_out");
    self.state = TaskState::TimedOut { elapsed };
    &self.state
  }

  /// Poll until the run reaches a terminal state.
  pub async fn wait(
    mut self,
    client: &dyn TaskClient,
    config: &PollConfig,
  ) -> Result<TaskState, TaskError> {
    loop {
      if self.step(client, config).await?.is_terminal() {
        return Ok(self.state);
      }
      let remaining = config.timeout.saturating_sub(self.submitted_at.elapsed());
      tokio::time::sleep(config.interval.min(remaining)).await;
    }
  }
}

/// Submit a task and wait for it to finish.
///
/// A submission that does not complete within the budget ends in `TimedOut`.
pub async fn run_task(
  client: &dyn TaskClient,
  task_name: &str,
  payload: serde_json::Value,
  config: &PollConfig,
) -> Result<TaskState, TaskError> {
  let started = Instant::now();
  let run = match tokio::time::timeout(config.timeout, TaskRun::start(client, task_name, payload))
    .await
  {
    Ok(run) => run?,
    Err(_) => {
      let elapsed = started.elapsed();
      debug!(task_name = %task_name, elapsed_ms = elapsed.as_millis() as u64, "task_submit_timed_out");
      return Ok(TaskState::TimedOut { elapsed });
    }
  };
  run.wait(client, config).await
}
