mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use weaver_engine::{EngineConfig, RunScope, RunSummary, WorkflowEngine, record_outputs};
use weaver_store::{RunRecord, RunStore, SqliteStore};
use weaver_task::{HttpTaskClient, PollConfig};
use weaver_workflow::{Workflow, compute_waves, find_cycle};

/// Weaver - run AI media workflows as a DAG
#[derive(Parser)]
#[command(name = "weaver")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.weaver)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Base URL of the task service that runs LLM, crop and frame tasks
  #[arg(
    long,
    global = true,
    env = "WEAVER_TASK_API_URL",
    default_value = "https://api.trigger.dev"
  )]
  task_api_url: String,

  /// API key for the task service
  #[arg(long, global = true, env = "WEAVER_TASK_API_KEY", hide_env_values = true)]
  task_api_key: Option<String>,

  /// How often to poll a running task
  #[arg(long, global = true, default_value_t = 1_000)]
  poll_interval_ms: u64,

  /// How long to wait for a task before giving up
  #[arg(long, global = true, default_value_t = 60_000)]
  task_timeout_ms: u64,

  /// Log filter used when RUST_LOG is not set
  #[arg(long, global = true, default_value = "warn")]
  log_level: String,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Check a workflow and print its execution waves
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Run a workflow or a single node
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },

  /// List stored runs of a workflow
  Runs {
    /// The workflow ID
    workflow_id: String,
  },
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run an entire workflow, or only some of its nodes
  Workflow {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Only run these nodes (comma separated); the others provide their
    /// cached output
    #[arg(long, value_delimiter = ',')]
    nodes: Vec<String>,

    #[command(flatten)]
    options: RunOptions,
  },

  /// Run a single node from a workflow
  Node {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,

    #[command(flatten)]
    options: RunOptions,
  },
}

#[derive(clap::Args)]
struct RunOptions {
  /// Save node outputs back into the workflow file as `lastOutput`
  #[arg(long)]
  write_back: bool,

  /// Store the run in the data directory
  #[arg(long)]
  persist: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init(&cli.log_level)?;

  let data_dir = match cli.data_dir.clone() {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".weaver"),
  };

  let Some(command) = cli.command else {
    println!("weaver - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  match command {
    Commands::Validate { workflow_file } => rt.block_on(validate(&workflow_file)),
    Commands::Run { target } => {
      let settings = Settings {
        task_api_url: cli.task_api_url,
        task_api_key: cli.task_api_key,
        poll: PollConfig::from_millis(cli.poll_interval_ms, cli.task_timeout_ms),
        data_dir,
      };
      let (workflow_file, scope, options) = match target {
        RunTarget::Workflow {
          workflow_file,
          nodes,
          options,
        } => {
          let scope = if nodes.is_empty() {
            RunScope::Full
          } else {
            RunScope::Partial(nodes)
          };
          (workflow_file, scope, options)
        }
        RunTarget::Node {
          workflow_file,
          node,
          options,
        } => (workflow_file, RunScope::Single(node), options),
      };
      rt.block_on(run(&settings, &workflow_file, scope, &options))
    }
    Commands::Runs { workflow_id } => rt.block_on(list_runs(&data_dir, &workflow_id)),
  }
}

struct Settings {
  task_api_url: String,
  task_api_key: Option<String>,
  poll: PollConfig,
  data_dir: PathBuf,
}

async fn load_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  Workflow::from_json(&content)
    .with_context(|| format!("invalid workflow file: {}", workflow_file.display()))
}

async fn validate(workflow_file: &Path) -> Result<()> {
  let workflow = load_workflow(workflow_file).await?;
  if let Some((from, to)) = find_cycle(&workflow) {
    bail!("workflow contains a cycle through edge '{}' -> '{}'", from, to);
  }

  let waves = compute_waves(&workflow);
  let graph = workflow.graph();
  let unknown: Vec<&str> = workflow
    .nodes()
    .iter()
    .filter(|node| !node.kind.is_known())
    .map(|node| node.id.as_str())
    .collect();
  for node_id in &unknown {
    warn!(node_id = %node_id, "unknown_node_kind");
  }

  let report = serde_json::json!({
    "workflowId": workflow.workflow_id(),
    "name": workflow.name(),
    "nodes": workflow.nodes().len(),
    "edges": workflow.edges().len(),
    "entryPoints": graph.entry_points(),
    "waves": waves,
    "unknownKinds": unknown,
  });
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

async fn run(
  settings: &Settings,
  workflow_file: &Path,
  scope: RunScope,
  options: &RunOptions,
) -> Result<()> {
  let mut workflow = load_workflow(workflow_file).await?;
  info!(file = %workflow_file.display(), nodes = workflow.nodes().len(), "workflow_loaded");

  let tasks = Arc::new(
    HttpTaskClient::new(settings.task_api_url.clone(), settings.task_api_key.clone())
      .context("failed to build task client")?,
  );
  let engine = WorkflowEngine::new(EngineConfig::with_poll(settings.poll), tasks);

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted, cancelling run");
      on_interrupt.cancel();
    }
  });

  let summary = engine.execute_scoped(&workflow, scope, cancel).await;
  println!("{}", serde_json::to_string_pretty(&summary)?);

  if options.persist {
    let workflow_id = workflow_id(&workflow, workflow_file);
    persist(&settings.data_dir, &workflow_id, &workflow, &summary).await?;
  }

  if options.write_back {
    let updated = record_outputs(&mut workflow, &summary).context("failed to record outputs")?;
    let content = serde_json::to_string_pretty(&workflow.to_def())?;
    tokio::fs::write(workflow_file, content)
      .await
      .with_context(|| format!("failed to write workflow file: {}", workflow_file.display()))?;
    info!(updated, "outputs_written_back");
  }

  if !summary.success {
    bail!(
      "run {} failed: {}",
      summary.run_id,
      summary.error.as_deref().unwrap_or("unknown error")
    );
  }
  Ok(())
}

/// The payload's workflow id, else the file name without extension.
fn workflow_id(workflow: &Workflow, workflow_file: &Path) -> String {
  workflow
    .workflow_id()
    .map(str::to_string)
    .or_else(|| {
      workflow_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
    })
    .unwrap_or_else(|| "workflow".to_string())
}

async fn open_store(data_dir: &Path) -> Result<SqliteStore> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
  SqliteStore::open(data_dir.join("runs.db"))
    .await
    .context("failed to open run store")
}

async fn persist(
  data_dir: &Path,
  workflow_id: &str,
  workflow: &Workflow,
  summary: &RunSummary,
) -> Result<()> {
  let store = open_store(data_dir).await?;
  let record = RunRecord::from_summary(workflow_id, workflow, summary);
  store.save_run(&record).await.context("failed to save run")?;
  info!(run_id = %record.run_id, status = ?record.status, "run_saved");
  Ok(())
}

async fn list_runs(data_dir: &Path, workflow_id: &str) -> Result<()> {
  let store = open_store(data_dir).await?;
  let runs = store
    .list_runs(workflow_id)
    .await
    .with_context(|| format!("failed to list runs for workflow '{}'", workflow_id))?;
  println!("{}", serde_json::to_string_pretty(&runs)?);
  Ok(())
}
