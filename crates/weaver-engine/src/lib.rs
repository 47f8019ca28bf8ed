//! Weaver Workflow Engine
//!
//! Runs a validated [`Workflow`](weaver_workflow::Workflow) wave by wave.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowEngine                         │
//! │  - execute(workflow, cancel) → RunSummary                   │
//! │  - cycle check, wave planning, per-wave join barrier        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │  resolve_inputs (per node)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 weaver_nodes::execute_node                  │
//! │  - per-kind handler, external tasks via TaskClient          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use weaver_engine::{EngineConfig, WorkflowEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let tasks = Arc::new(HttpTaskClient::new("https://tasks.example.com", Some(key))?);
//! let engine = WorkflowEngine::new(EngineConfig::default(), tasks);
//! let summary = engine.execute(&workflow, CancellationToken::new()).await;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! ```

mod config;
mod engine;
mod error;
mod events;
mod input;
mod result;

pub use config::EngineConfig;
pub use engine::{WorkflowEngine, record_outputs};
pub use error::ExecutionError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use input::resolve_inputs;
pub use result::{NodeResult, RunOutcome, RunScope, RunSummary};
