//! Run events and notifiers.
//!
//! The engine reports progress through an [`ExecutionNotifier`] so callers can
//! stream it to a UI, persist it, or ignore it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while a run progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
  RunStarted {
    run_id: String,
    workflow_id: Option<String>,
    waves: usize,
  },

  /// Every node of the wave is about to be dispatched.
  WaveStarted {
    run_id: String,
    index: usize,
    node_ids: Vec<String>,
  },

  NodeStarted {
    run_id: String,
    node_id: String,
  },

  NodeCompleted {
    run_id: String,
    node_id: String,
    output: serde_json::Value,
    duration_ms: u64,
  },

  /// The node resolved with an error. The run continues.
  NodeFailed {
    run_id: String,
    node_id: String,
    error: String,
  },

  /// All waves ran. Individual nodes may still have failed.
  RunCompleted {
    run_id: String,
    duration_ms: u64,
  },

  RunFailed {
    run_id: String,
    error: String,
  },
}

pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events to an unbounded channel.
///
/// Unbounded so a slow consumer never holds up the engine; volume is a few
/// events per node.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier along with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // The receiver may be gone; events are best effort.
    let _ = self.sender.send(event);
  }
}
