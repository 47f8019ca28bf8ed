use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one node in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub duration_ms: u64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
}

impl NodeResult {
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }
}

/// Which nodes a run executes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "nodes", rename_all = "camelCase")]
pub enum RunScope {
  /// Every node in the workflow.
  #[default]
  Full,
  /// The listed nodes; the rest contribute their cached output.
  Partial(Vec<String>),
  /// One node, fed from cached upstream outputs.
  Single(String),
}

impl RunScope {
  /// Whether a node is executed under this scope.
  pub fn includes(&self, node_id: &str) -> bool {
    match self {
      RunScope::Full => true,
      RunScope::Partial(ids) => ids.iter().any(|id| id == node_id),
      RunScope::Single(id) => id == node_id,
    }
  }

  /// Node ids named by the scope, if it names any.
  pub fn node_ids(&self) -> Vec<&str> {
    match self {
      RunScope::Full => Vec::new(),
      RunScope::Partial(ids) => {
        let mut seen = HashSet::new();
        ids
          .iter()
          .map(String::as_str)
          .filter(|id| seen.insert(*id))
          .collect()
      }
      RunScope::Single(id) => vec![id.as_str()],
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RunScope::Full => "FULL",
      RunScope::Partial(_) => "PARTIAL",
      RunScope::Single(_) => "SINGLE",
    }
  }
}

impl fmt::Display for RunScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
  /// Every executed node produced an output.
  Success,
  /// The run finished but some nodes failed.
  Partial,
  /// The run was rejected or aborted.
  Failed,
}

impl RunOutcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      RunOutcome::Success => "SUCCESS",
      RunOutcome::Partial => "PARTIAL",
      RunOutcome::Failed => "FAILED",
    }
  }
}

impl fmt::Display for RunOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Record of one run.
///
/// `success` is about the run, not its nodes: a run whose nodes all failed
/// still succeeds if every wave was dispatched and joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
  pub run_id: String,
  pub success: bool,
  pub node_results: BTreeMap<String, NodeResult>,
  pub total_duration_ms: u64,
  pub scope: RunScope,
  pub started_at: DateTime<Utc>,
  /// Why the run failed, when `success` is false.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl RunSummary {
  pub fn status(&self) -> RunOutcome {
    if !self.success {
      RunOutcome::Failed
    } else if self.node_results.values().all(NodeResult::is_success) {
      RunOutcome::Success
    } else {
      RunOutcome::Partial
    }
  }

  pub fn output(&self, node_id: &str) -> Option<&serde_json::Value> {
    self.node_results.get(node_id)?.output.as_ref()
  }

  pub fn error(&self, node_id: &str) -> Option<&str> {
    self.node_results.get(node_id)?.error.as_deref()
  }
}
