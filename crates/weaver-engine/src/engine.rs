//! Workflow execution engine.
//!
//! The `WorkflowEngine` runs a workflow one wave at a time. Every node of a
//! wave is spawned at once and the next wave starts only after all of them
//! have resolved.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use weaver_nodes::{NodeContext, NodeInputs, execute_node as execute_node_kind};
use weaver_task::TaskClient;
use weaver_workflow::{Node, Wave, Workflow, WorkflowError, compute_waves, find_cycle};

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::input::resolve_inputs;
use crate::result::{NodeResult, RunScope, RunSummary};

/// The workflow execution engine.
///
/// Generic over `N: ExecutionNotifier` so callers choose what happens to run
/// events. `WorkflowEngine::new()` discards them.
pub struct WorkflowEngine<N: ExecutionNotifier = NoopNotifier> {
  config: EngineConfig,
  tasks: Arc<dyn TaskClient>,
  notifier: N,
}

impl WorkflowEngine<NoopNotifier> {
  pub fn new(config: EngineConfig, tasks: Arc<dyn TaskClient>) -> Self {
    Self::with_notifier(config, tasks, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> WorkflowEngine<N> {
  pub fn with_notifier(config: EngineConfig, tasks: Arc<dyn TaskClient>, notifier: N) -> Self {
    Self {
      config,
      tasks,
      notifier,
    }
  }

  /// Run every node of the workflow.
  pub async fn execute(&self, workflow: &Workflow, cancel: CancellationToken) -> RunSummary {
    self.execute_scoped(workflow, RunScope::Full, cancel).await
  }

  /// Run a single node, feeding it the cached outputs of its upstream nodes.
  pub async fn execute_node(
    &self,
    workflow: &Workflow,
    node_id: &str,
    cancel: CancellationToken,
  ) -> RunSummary {
    self
      .execute_scoped(workflow, RunScope::Single(node_id.to_string()), cancel)
      .await
  }

  /// Run the nodes selected by `scope`.
  ///
  /// Nodes outside the scope are not executed; their `last_output`, if any,
  /// is available to the nodes that are. Engine-level failures end the run
  /// with `success == false` and keep the node results gathered so far.
  #[instrument(
    skip_all,
    fields(workflow_id = workflow.workflow_id().unwrap_or_default(), scope = %scope)
  )]
  pub async fn execute_scoped(
    &self,
    workflow: &Workflow,
    scope: RunScope,
    cancel: CancellationToken,
  ) -> RunSummary {
    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let start = Instant::now();
    let mut results = BTreeMap::new();

    let outcome = self
      .run(workflow, &scope, &run_id, &mut results, &cancel)
      .await;
    let total_duration_ms = start.elapsed().as_millis() as u64;

    match &outcome {
      Ok(()) => {
        info!(run_id = %run_id, nodes = results.len(), duration_ms = total_duration_ms, "run_completed");
        self.notifier.notify(ExecutionEvent::RunCompleted {
          run_id: run_id.clone(),
          duration_ms: total_duration_ms,
        });
      }
      Err(e) => {
        error!(run_id = %run_id, error = %e, "run_failed");
        self.notifier.notify(ExecutionEvent::RunFailed {
          run_id: run_id.clone(),
          error: e.to_string(),
        });
      }
    }

    RunSummary {
      run_id,
      success: outcome.is_ok(),
      node_results: results,
      total_duration_ms,
      scope,
      started_at,
      error: outcome.err().map(|e| e.to_string()),
    }
  }

  async fn run(
    &self,
    workflow: &Workflow,
    scope: &RunScope,
    run_id: &str,
    results: &mut BTreeMap<String, NodeResult>,
    cancel: &CancellationToken,
  ) -> Result<(), ExecutionError> {
    if let Some((from, to)) = find_cycle(workflow) {
      return Err(ExecutionError::Cycle { from, to });
    }
    if let Some(missing) = scope.node_ids().into_iter().find(|id| !workflow.contains(id)) {
      return Err(ExecutionError::UnknownNode(missing.to_string()));
    }

    let waves = plan_waves(workflow, scope);
    info!(run_id = %run_id, waves = waves.len(), "run_started");
    self.notifier.notify(ExecutionEvent::RunStarted {
      run_id: run_id.to_string(),
      workflow_id: workflow.workflow_id().map(str::to_string),
      waves: waves.len(),
    });

    let ctx = NodeContext::new(self.tasks.clone(), self.config.poll);
    let mut outputs = seed_outputs(workflow, scope);

    for (index, wave) in waves.iter().enumerate() {
      if cancel.is_cancelled() {
        return Err(ExecutionError::Cancelled);
      }
      self
        .run_wave(
          workflow,
          index,
          wave,
          &ctx,
          &mut outputs,
          results,
          run_id,
          cancel,
        )
        .await?;
    }

    Ok(())
  }

  /// Dispatch one wave and wait for every node in it.
  #[allow(clippy::too_many_arguments)]
  async fn run_wave(
    &self,
    workflow: &Workflow,
    index: usize,
    wave: &Wave,
    ctx: &NodeContext,
    outputs: &mut HashMap<String, serde_json::Value>,
    results: &mut BTreeMap<String, NodeResult>,
    run_id: &str,
    cancel: &CancellationToken,
  ) -> Result<(), ExecutionError> {
    info!(run_id = %run_id, wave = index, nodes = wave.len(), "wave_started");
    self.notifier.notify(ExecutionEvent::WaveStarted {
      run_id: run_id.to_string(),
      index,
      node_ids: wave.clone(),
    });

    let mut handles = Vec::with_capacity(wave.len());
    for node_id in wave {
      let node = workflow
        .node(node_id)
        .ok_or_else(|| ExecutionError::UnknownNode(node_id.clone()))?
        .clone();
      // Inputs come from earlier waves only; `outputs` is untouched until the
      // whole wave has joined.
      let inputs = resolve_inputs(workflow, outputs, node_id);

      self.notifier.notify(ExecutionEvent::NodeStarted {
        run_id: run_id.to_string(),
        node_id: node_id.clone(),
      });
      handles.push(tokio::spawn(run_node(ctx.clone(), node, inputs)));
    }

    let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();
    let joined = tokio::select! {
      joined = join_all(handles) => joined,
      _ = cancel.cancelled() => {
        for abort in &aborts {
          abort.abort();
        }
        return Err(ExecutionError::Cancelled);
      }
    };

    let mut failure = None;
    for (node_id, joined) in wave.iter().zip(joined) {
      match joined {
        Ok(result) => {
          self.report(run_id, &result);
          if let Some(output) = &result.output {
            outputs.insert(node_id.clone(), output.clone());
          }
          results.insert(node_id.clone(), result);
        }
        Err(e) => {
          error!(run_id = %run_id, node_id = %node_id, error = %e, "node_join_failed");
          failure.get_or_insert(ExecutionError::Join {
            node_id: node_id.clone(),
            message: e.to_string(),
          });
        }
      }
    }

    match failure {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }

  fn report(&self, run_id: &str, result: &NodeResult) {
    match (&result.output, &result.error) {
      (_, Some(error)) => {
        warn!(run_id = %run_id, node_id = %result.node_id, error = %error, "node_failed");
        self.notifier.notify(ExecutionEvent::NodeFailed {
          run_id: run_id.to_string(),
          node_id: result.node_id.clone(),
          error: error.clone(),
        });
      }
      (output, None) => {
        info!(run_id = %run_id, node_id = %result.node_id, duration_ms = result.duration_ms, "node_completed");
        self.notifier.notify(ExecutionEvent::NodeCompleted {
          run_id: run_id.to_string(),
          node_id: result.node_id.clone(),
          output: output.clone().unwrap_or_default(),
          duration_ms: result.duration_ms,
        });
      }
    }
  }
}

/// Waves restricted to the nodes in scope, dropping waves left empty.
fn plan_waves(workflow: &Workflow, scope: &RunScope) -> Vec<Wave> {
  compute_waves(workflow)
    .into_iter()
    .map(|wave| {
      wave
        .into_iter()
        .filter(|id| scope.includes(id))
        .collect::<Wave>()
    })
    .filter(|wave| !wave.is_empty())
    .collect()
}

/// Cached outputs of the nodes a scoped run will not execute.
fn seed_outputs(workflow: &Workflow, scope: &RunScope) -> HashMap<String, serde_json::Value> {
  if *scope == RunScope::Full {
    return HashMap::new();
  }
  workflow
    .nodes()
    .iter()
    .filter(|node| !scope.includes(&node.id))
    .filter_map(|node| {
      let output = node.last_output.as_ref().filter(|v| !v.is_null())?;
      Some((node.id.clone(), output.clone()))
    })
    .collect()
}

#[instrument(skip_all, fields(node_id = %node.id, kind = %node.kind))]
async fn run_node(ctx: NodeContext, node: Node, inputs: NodeInputs) -> NodeResult {
  let started_at = Utc::now();
  let start = Instant::now();
  let outcome = execute_node_kind(&ctx, &node, inputs).await;
  NodeResult {
    node_id: node.id,
    output: outcome.output,
    error: outcome.error,
    duration_ms: start.elapsed().as_millis() as u64,
    started_at,
    completed_at: Utc::now(),
  }
}

/// Write each produced output back as the node's `last_output`.
///
/// Nodes that failed keep their previous cached value. Returns how many
/// nodes were updated.
pub fn record_outputs(workflow: &mut Workflow, summary: &RunSummary) -> Result<usize, WorkflowError> {
  let mut updated = 0;
  for (node_id, result) in &summary.node_results {
    if let Some(output) = &result.output {
      workflow.set_last_output(node_id, Some(output.clone()))?;
      updated += 1;
    }
  }
  Ok(updated)
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use weaver_config::{EdgeDef, NodeDef, NodeKind};

  use super::*;

  fn chain() -> Workflow {
    Workflow::new(
      None,
      "chain",
      vec![
        NodeDef::new("a", NodeKind::Text).into(),
        NodeDef::new("b", NodeKind::Text).into(),
        NodeDef {
          last_output: Some(json!("cached c")),
          ..NodeDef::new("c", NodeKind::Text)
        }
        .into(),
      ],
      vec![
        EdgeDef::new("e1", "a", "output", "b", "input").into(),
        EdgeDef::new("e2", "b", "output", "c", "input").into(),
      ],
    )
    .unwrap()
  }

  #[test]
  fn test_plan_waves_full() {
    assert_eq!(
      plan_waves(&chain(), &RunScope::Full),
      vec![vec!["a".to_string()], vec!["b".to_string()], vec!["c".to_string()]]
    );
  }

  #[test]
  fn test_plan_waves_partial_drops_empty_waves() {
    let scope = RunScope::Partial(vec!["c".to_string(), "a".to_string()]);
    assert_eq!(
      plan_waves(&chain(), &scope),
      vec![vec!["a".to_string()], vec!["c".to_string()]]
    );
  }

  #[test]
  fn test_seed_outputs_only_outside_scope() {
    let wf = chain();
    assert!(seed_outputs(&wf, &RunScope::Full).is_empty());

    let seeded = seed_outputs(&wf, &RunScope::Single("b".to_string()));
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded.get("c"), Some(&json!("cached c")));

    assert!(seed_outputs(&wf, &RunScope::Single("c".to_string())).is_empty());
  }
}
