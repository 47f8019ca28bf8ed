use std::sync::Arc;

use weaver_task::{PollConfig, TaskClient};

/// What handlers may touch while executing a node.
#[derive(Clone)]
pub struct NodeContext {
  tasks: Arc<dyn TaskClient>,
  poll: PollConfig,
}

impl NodeContext {
  pub fn new(tasks: Arc<dyn TaskClient>, poll: PollConfig) -> Self {
    Self { tasks, poll }
  }

  pub fn tasks(&self) -> &dyn TaskClient {
    self.tasks.as_ref()
  }

  pub fn poll(&self) -> &PollConfig {
    &self.poll
  }
}

impl std::fmt::Debug for NodeContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NodeContext")
      .field("poll", &self.poll)
      .finish_non_exhaustive()
  }
}
