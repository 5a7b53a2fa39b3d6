// crates/actionruntime/tests/common/mod.rs

#![allow(dead_code)]

use actioncore::{
    ActionNode, ExecutionContext, NodeError, NodeStrategy, PortValues, Value,
};
use actionruntime::StrategyRegistry;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Records every node it runs; outputs its inputs plus `params.value` on
/// the `value` port.
#[derive(Default)]
pub struct SpyStrategy {
    pub calls: Mutex<Vec<String>>,
    pub count: AtomicUsize,
}

impl SpyStrategy {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeStrategy for SpyStrategy {
    fn node_type(&self) -> &str {
        "spy"
    }

    fn label(&self) -> &str {
        "Spy"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        _ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(node.id.clone());

        let mut outputs = inputs;
        if let Some(value) = node.params.get("value") {
            outputs.insert("value".to_string(), value.clone());
        }
        outputs.insert("ran".to_string(), Value::Bool(true));
        Ok(outputs)
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        match node.params.get("reject") {
            Some(Value::Bool(true)) => vec!["spy node asked to be rejected".to_string()],
            _ => Vec::new(),
        }
    }
}

pub struct FailStrategy;

#[async_trait]
impl NodeStrategy for FailStrategy {
    fn node_type(&self) -> &str {
        "fail"
    }

    fn label(&self) -> &str {
        "Fail"
    }

    async fn execute(
        &self,
        _node: &ActionNode,
        _inputs: PortValues,
        _ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        Err(NodeError::ExecutionFailed("boom".to_string()))
    }
}

pub struct PanicStrategy;

#[async_trait]
impl NodeStrategy for PanicStrategy {
    fn node_type(&self) -> &str {
        "panic"
    }

    fn label(&self) -> &str {
        "Panic"
    }

    async fn execute(
        &self,
        _node: &ActionNode,
        _inputs: PortValues,
        _ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        panic!("strategy exploded");
    }
}

/// Writes `params.value` into the variable named by `params.name`.
pub struct AssignStrategy;

#[async_trait]
impl NodeStrategy for AssignStrategy {
    fn node_type(&self) -> &str {
        "assign"
    }

    fn label(&self) -> &str {
        "Assign"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        _inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let name = node
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| NodeError::MissingInput("name".to_string()))?;
        let value = node.params.get("value").cloned().unwrap_or_default();
        ctx.set_variable(name, value);
        Ok(PortValues::new())
    }
}

/// Waits on a shared barrier, so it only completes if its siblings run
/// concurrently with it.
pub struct BarrierStrategy {
    pub barrier: Arc<Barrier>,
}

#[async_trait]
impl NodeStrategy for BarrierStrategy {
    fn node_type(&self) -> &str {
        "barrier"
    }

    fn label(&self) -> &str {
        "Barrier"
    }

    async fn execute(
        &self,
        _node: &ActionNode,
        _inputs: PortValues,
        _ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        self.barrier.wait().await;
        Ok(PortValues::new())
    }
}

pub fn registry_with(spy: Arc<SpyStrategy>) -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(spy);
    registry.register(Arc::new(FailStrategy));
    registry.register(Arc::new(PanicStrategy));
    registry.register(Arc::new(AssignStrategy));
    registry
}

pub fn spy_node(id: &str) -> ActionNode {
    ActionNode::new(id, "spy").with_label(id)
}
