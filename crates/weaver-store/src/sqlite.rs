use std::path::Path;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{Error, NodeExecution, RunRecord, RunStore};

/// SQLite-based store implementation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) a database file and bring its schema up to
  /// date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// A migrated, private in-memory database.
  pub async fn in_memory() -> Result<Self, Error> {
    // Every connection to `:memory:` is its own database.
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(&self.pool).await
  }

  async fn load_nodes(&self, run_id: &str) -> Result<Vec<NodeExecution>, Error> {
    let nodes = sqlx::query_as(
      r#"
      SELECT run_id, node_id, node_kind, status, output, error, duration_ms, started_at, completed_at
      FROM node_executions
      WHERE run_id = ?
      ORDER BY started_at ASC, node_id ASC
      "#,
    )
    .bind(run_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(nodes)
  }
}

#[async_trait]
impl RunStore for SqliteStore {
  async fn save_run(&self, run: &RunRecord) -> Result<(), Error> {
    let mut tx = self.pool.begin().await?;

    sqlx::query("DELETE FROM node_executions WHERE run_id = ?")
      .bind(&run.run_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM workflow_runs WHERE run_id = ?")
      .bind(&run.run_id)
      .execute(&mut *tx)
      .await?;

    sqlx::query(
      r#"
      INSERT INTO workflow_runs (run_id, workflow_id, status, scope, error, duration_ms, started_at, completed_at)
      VALUES (?, ?, ?, ?, ?, ?, ?, ?)
      "#,
    )
    .bind(&run.run_id)
    .bind(&run.workflow_id)
    .bind(run.status)
    .bind(&run.scope)
    .bind(&run.error)
    .bind(run.duration_ms)
    .bind(run.started_at)
    .bind(run.completed_at)
    .execute(&mut *tx)
    .await?;

    for node in &run.node_executions {
      sqlx::query(
        r#"
        INSERT INTO node_executions (run_id, node_id, node_kind, status, output, error, duration_ms, started_at, completed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(&run.run_id)
      .bind(&node.node_id)
      .bind(&node.node_kind)
      .bind(node.status)
      .bind(&node.output)
      .bind(&node.error)
      .bind(node.duration_ms)
      .bind(node.started_at)
      .bind(node.completed_at)
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await?;
    Ok(())
  }

  async fn get_run(&self, run_id: &str) -> Result<RunRecord, Error> {
    let run: Option<RunRecord> = sqlx::query_as(
      r#"
      SELECT run_id, workflow_id, status, scope, error, duration_ms, started_at, completed_at
      FROM workflow_runs
      WHERE run_id = ?
      "#,
    )
    .bind(run_id)
    .fetch_optional(&self.pool)
    .await?;

    let mut run = run.ok_or_else(|| Error::NotFound(format!("run '{}'", run_id)))?;
    run.node_executions = self.load_nodes(run_id).await?;
    Ok(run)
  }

  async fn list_runs(&self, workflow_id: &str) -> Result<Vec<RunRecord>, Error> {
    let mut runs: Vec<RunRecord> = sqlx::query_as(
      r#"
      SELECT run_id, workflow_id, status, scope, error, duration_ms, started_at, completed_at
      FROM workflow_runs
      WHERE workflow_id = ?
      ORDER BY started_at DESC
      "#,
    )
    .bind(workflow_id)
    .fetch_all(&self.pool)
    .await?;

    for run in &mut runs {
      run.node_executions = self.load_nodes(&run.run_id).await?;
    }
    Ok(runs)
  }
}
