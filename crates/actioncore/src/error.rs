use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Flow execution cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-node failures. These never abort a run; they end up in the node's
/// `NodeExecutionResult::error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Flow not found: {0}")]
    NotFound(String),

    #[error("No entry nodes found in flow")]
    NoEntryNodes,

    #[error("Circular dependency detected; stalled nodes: {}", .pending.join(", "))]
    CircularDependency { pending: Vec<String> },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("No strategy registered for node type: {0}")]
    NoStrategy(String),

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
}
