//! Weaver Workflow
//!
//! This crate provides the validated workflow representation for Weaver.
//! A workflow is built from a [`weaver_config::WorkflowDef`] payload and is
//! ready for the engine to plan and run.
//!
//! Key differences from `weaver-config`:
//! - Node ids are unique and every edge references existing nodes
//! - Each (node, port) pair is fed by at most one edge, except `images`
//! - Cycle detection ([`has_cycle`]) and wave planning ([`compute_waves`])
//!   operate on it

mod cycle;
mod error;
mod graph;
mod node;
mod topology;
mod workflow;

pub use cycle::{find_cycle, has_cycle};
pub use error::WorkflowError;
pub use graph::Graph;
pub use node::{Edge, Node};
pub use topology::{Wave, compute_waves, wave_index};
pub use workflow::{IMAGES_PORT, Workflow};
