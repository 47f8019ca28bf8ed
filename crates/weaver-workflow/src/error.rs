use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("edge '{edge_id}' references unknown node: from={from}, to={to}")]
  InvalidEdge {
    edge_id: String,
    from: String,
    to: String,
  },

  #[error("port '{port}' on node '{node_id}' is fed by more than one edge ('{first}' and '{second}')")]
  DuplicatePortBinding {
    node_id: String,
    port: String,
    first: String,
    second: String,
  },

  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("invalid workflow payload: {0}")]
  InvalidPayload(#[from] serde_json::Error),
}
