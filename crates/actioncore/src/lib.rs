//! Core abstractions for the action flow engine
//!
//! This crate provides the data model (flows, nodes, ports, edges), the
//! per-run execution context, the strategy trait every node type implements,
//! and the error and event types shared by the other crates.

mod context;
mod error;
pub mod events;
mod flow;
mod strategy;
mod value;

pub use context::{ExecutionContext, ExecutionServices, MessageType, NavigateOptions, PortValues};
pub use error::{FlowError, NodeError, WorkflowError};
pub use events::*;
pub use flow::{ActionEdge, ActionFlow, ActionNode, FlowId, NodeId, Params, Port, PortType};
pub use strategy::{
    params_from, validate_base, NodeExecutionResult, NodeStrategy, ValidationResult,
};
pub use value::Value;
