//! Weaver Nodes
//!
//! One [`NodeHandler`] per node kind, and the dispatch that picks it.
//!
//! [`execute_node`] is the boundary the engine calls. It always returns a
//! [`NodeOutcome`] carrying either an output value or a readable error
//! message; handler failures never escape as errors.
//!
//! Adding a node kind means adding a handler module under `kinds` and one arm
//! in [`handler_for`].

mod context;
mod dispatch;
mod error;
mod handler;
mod inputs;
mod kinds;
mod params;

pub use context::NodeContext;
pub use dispatch::{NodeOutcome, execute_node, handler_for};
pub use error::NodeError;
pub use handler::NodeHandler;
pub use inputs::NodeInputs;
pub use kinds::{
  CropImageNode, CropRegion, ExtractFrameNode, FrameTimestamp, LlmNode, TextNode, UploadNode,
};
