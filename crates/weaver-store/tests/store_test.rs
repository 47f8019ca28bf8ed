use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use weaver_config::{NodeDef, NodeKind};
use weaver_engine::{NodeResult, RunScope, RunSummary};
use weaver_store::{Error, NodeStatus, RunRecord, RunStatus, RunStore, SqliteStore};
use weaver_workflow::Workflow;

fn workflow() -> Workflow {
  Workflow::new(
    Some("wf_1".to_string()),
    "demo",
    vec![
      NodeDef::new("text", NodeKind::Text).into(),
      NodeDef::new("crop", NodeKind::CropImage).into(),
    ],
    vec![],
  )
  .unwrap()
}

fn summary(run_id: &str, started_minutes: i64, crop_error: Option<&str>) -> RunSummary {
  let started_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    + Duration::minutes(started_minutes);
  let node = |node_id: &str, output: Option<serde_json::Value>, error: Option<&str>| NodeResult {
    node_id: node_id.to_string(),
    output,
    error: error.map(str::to_string),
    duration_ms: 5,
    started_at,
    completed_at: started_at + Duration::milliseconds(5),
  };

  let mut node_results = BTreeMap::new();
  node_results.insert("text".to_string(), node("text", Some(json!("hello")), None));
  node_results.insert(
    "crop".to_string(),
    match crop_error {
      Some(error) => node("crop", None, Some(error)),
      None => node("crop", Some(json!("cropped.png")), None),
    },
  );

  RunSummary {
    run_id: run_id.to_string(),
    success: true,
    node_results,
    total_duration_ms: 20,
    scope: RunScope::Full,
    started_at,
    error: None,
  }
}

#[test]
fn test_record_from_summary() {
  let record = RunRecord::from_summary("wf_1", &workflow(), &summary("r1", 0, Some("no image")));

  assert_eq!(record.status, RunStatus::Partial);
  assert_eq!(record.scope, "FULL");
  assert_eq!(record.duration_ms, 20);
  assert_eq!(
    record.completed_at - record.started_at,
    Duration::milliseconds(20)
  );

  let crop = record.node("crop").unwrap();
  assert_eq!(crop.node_kind, "crop-image");
  assert_eq!(crop.status, NodeStatus::Failed);
  assert_eq!(crop.error.as_deref(), Some("no image"));
  assert!(crop.output.is_none());
}

#[tokio::test]
async fn test_save_and_get() {
  let store = SqliteStore::in_memory().await.unwrap();
  let record = RunRecord::from_summary("wf_1", &workflow(), &summary("r1", 0, None));

  store.save_run(&record).await.unwrap();
  let loaded = store.get_run("r1").await.unwrap();

  assert_eq!(loaded.status, RunStatus::Success);
  assert_eq!(loaded.node_executions.len(), 2);
  assert_eq!(
    loaded.node("text").unwrap().output.as_ref().map(|o| &o.0),
    Some(&json!("hello"))
  );
  assert_eq!(loaded.node("crop").unwrap().node_kind, "crop-image");
  assert_eq!(loaded.started_at, record.started_at);
}

#[tokio::test]
async fn test_save_twice_replaces() {
  let store = SqliteStore::in_memory().await.unwrap();
  let wf = workflow();

  store
    .save_run(&RunRecord::from_summary("wf_1", &wf, &summary("r1", 0, Some("no image"))))
    .await
    .unwrap();
  store
    .save_run(&RunRecord::from_summary("wf_1", &wf, &summary("r1", 0, None)))
    .await
    .unwrap();

  let loaded = store.get_run("r1").await.unwrap();
  assert_eq!(loaded.status, RunStatus::Success);
  assert_eq!(loaded.node_executions.len(), 2);
  assert_eq!(store.list_runs("wf_1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_runs_newest_first() {
  let store = SqliteStore::in_memory().await.unwrap();
  let wf = workflow();
  for (run_id, minutes) in [("old", 0), ("new", 10), ("mid", 5)] {
    let record = RunRecord::from_summary("wf_1", &wf, &summary(run_id, minutes, None));
    store.save_run(&record).await.unwrap();
  }
  let other = RunRecord::from_summary("wf_2", &wf, &summary("elsewhere", 20, None));
  store.save_run(&other).await.unwrap();

  let runs = store.list_runs("wf_1").await.unwrap();
  let ids: Vec<&str> = runs.iter().map(|r| r.run_id.as_str()).collect();
  assert_eq!(ids, vec!["new", "mid", "old"]);
  assert!(runs.iter().all(|r| r.node_executions.len() == 2));
}

#[tokio::test]
async fn test_get_missing_run() {
  let store = SqliteStore::in_memory().await.unwrap();
  let err = store.get_run("nope").await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}
