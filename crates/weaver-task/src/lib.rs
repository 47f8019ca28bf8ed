//! Weaver Task
//!
//! Client side of the external task system that performs the heavy node
//! effects (LLM generation, image crop, frame extraction).
//!
//! - [`TaskClient`] is the collaborator seam: `submit` a named task with a
//!   JSON payload, then `poll_status` its run.
//! - [`TaskRun`] drives a submitted run through its states until it reaches
//!   a terminal status or the [`PollConfig`] budget runs out.
//! - [`HttpTaskClient`] talks to a task service over HTTP.

mod client;
mod error;
mod http;
mod run;
mod status;

pub use client::{TaskClient, TaskHandle, TaskSnapshot};
pub use error::TaskError;
pub use http::HttpTaskClient;
pub use run::{PollConfig, TaskRun, TaskState, run_task};
pub use status::RunStatus;
