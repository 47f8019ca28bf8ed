//! Weaver Config
//!
//! This crate contains the serializable workflow payload types for Weaver.
//! These types represent a graph as the authoring surface saves it, before it
//! is validated and turned into a runnable workflow.
//!
//! Payloads can be loaded from:
//! - JSON files (via the CLI)
//! - Database storage (as JSON blobs)
//!
//! Field names follow the authoring surface (`camelCase`), and the edge fields
//! also accept the canvas names (`source`, `target`, `sourceHandle`,
//! `targetHandle`).

mod edge;
mod kind;
mod node;
mod workflow;

pub use edge::{DEFAULT_SOURCE_PORT, DEFAULT_TARGET_PORT, EdgeDef};
pub use kind::NodeKind;
pub use node::NodeDef;
pub use workflow::WorkflowDef;
