use serde::{Deserialize, Serialize};
use weaver_task::PollConfig;

/// Configuration for the workflow engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Polling cadence and budget for external tasks.
  #[serde(default)]
  pub poll: PollConfig,
}

impl EngineConfig {
  pub fn with_poll(poll: PollConfig) -> Self {
    Self { poll }
  }
}
