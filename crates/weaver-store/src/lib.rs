//! Weaver Store
//!
//! Run history for workflows. The engine hands back a
//! [`RunSummary`](weaver_engine::RunSummary); callers convert it with
//! [`RunRecord::from_summary`] and save it through a [`RunStore`].

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{NodeExecution, NodeStatus, RunRecord, RunStatus};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Storage for finished runs.
#[async_trait]
pub trait RunStore: Send + Sync {
  /// Save a run and its node executions. Saving the same run twice replaces
  /// it.
  async fn save_run(&self, run: &RunRecord) -> Result<(), Error>;

  async fn get_run(&self, run_id: &str) -> Result<RunRecord, Error>;

  /// Runs of a workflow, newest first.
  async fn list_runs(&self, workflow_id: &str) -> Result<Vec<RunRecord>, Error>;
}
