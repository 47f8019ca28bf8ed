use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use weaver_engine::{RunOutcome, RunSummary};
use weaver_workflow::Workflow;

/// Status of a stored run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
  Success,
  Partial,
  Failed,
}

impl From<RunOutcome> for RunStatus {
  fn from(outcome: RunOutcome) -> Self {
    match outcome {
      RunOutcome::Success => RunStatus::Success,
      RunOutcome::Partial => RunStatus::Partial,
      RunOutcome::Failed => RunStatus::Failed,
    }
  }
}

/// Status of a stored node execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
  Success,
  Failed,
}

/// A run as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
  pub run_id: String,
  pub workflow_id: String,
  pub status: RunStatus,
  /// `FULL`, `PARTIAL` or `SINGLE`.
  pub scope: String,
  pub error: Option<String>,
  pub duration_ms: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
  #[sqlx(skip)]
  pub node_executions: Vec<NodeExecution>,
}

/// One node's part in a stored run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecution {
  pub run_id: String,
  pub node_id: String,
  pub node_kind: String,
  pub status: NodeStatus,
  pub output: Option<Json<serde_json::Value>>,
  pub error: Option<String>,
  pub duration_ms: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
}

impl RunRecord {
  /// Capture a finished run. `workflow` supplies each node's kind.
  pub fn from_summary(workflow_id: &str, workflow: &Workflow, summary: &RunSummary) -> Self {
    let duration_ms = summary.total_duration_ms as i64;
    let node_executions = summary
      .node_results
      .values()
      .map(|result| NodeExecution {
        run_id: summary.run_id.clone(),
        node_id: result.node_id.clone(),
        node_kind: workflow
          .node(&result.node_id)
          .map(|node| node.kind.to_string())
          .unwrap_or_default(),
        status: if result.is_success() {
          NodeStatus::Success
        } else {
          NodeStatus::Failed
        },
        output: result.output.clone().map(Json),
        error: result.error.clone(),
        duration_ms: result.duration_ms as i64,
        started_at: result.started_at,
        completed_at: result.completed_at,
      })
      .collect();

    Self {
      run_id: summary.run_id.clone(),
      workflow_id: workflow_id.to_string(),
      status: summary.status().into(),
      scope: summary.scope.to_string(),
      error: summary.error.clone(),
      duration_ms,
      started_at: summary.started_at,
      completed_at: summary.started_at + chrono::Duration::milliseconds(duration_ms),
      node_executions,
    }
  }

  pub fn node(&self, node_id: &str) -> Option<&NodeExecution> {
    self.node_executions.iter().find(|n| n.node_id == node_id)
  }
}
