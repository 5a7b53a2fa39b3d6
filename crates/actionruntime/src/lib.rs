//! Action flow execution runtime
//!
//! This crate provides the engine that runs action flows: the strategy
//! registry, the edge-condition evaluator, the batch executor, a static flow
//! validator and a runtime facade tying them to an event bus.

pub mod condition;
mod executor;
mod loader;
mod registry;
mod runtime;
mod validate;

pub use condition::{evaluate, evaluate_detailed, ConditionError};
pub use executor::{ExecutorConfig, FlowExecutor};
pub use loader::{load_flow, parse_flow};
pub use registry::{StrategyMetadata, StrategyRegistry};
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use validate::{FlowValidator, ValidationReport};
