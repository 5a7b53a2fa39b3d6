use crate::executor::{ExecutorConfig, FlowExecutor};
use crate::registry::StrategyRegistry;
use crate::validate::{FlowValidator, ValidationReport};
use actioncore::{
    ActionFlow, EventBus, ExecutionContext, ExecutionEvent, FlowError, FlowId,
    NodeExecutionResult, WorkflowError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Main runtime for executing action flows
pub struct FlowRuntime {
    registry: Arc<StrategyRegistry>,
    executor: FlowExecutor,
    event_bus: Arc<EventBus>,
    flows: RwLock<HashMap<FlowId, ActionFlow>>,
}

impl FlowRuntime {
    /// Create a new runtime with an empty registry and default settings
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with an empty registry
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_registry(Arc::new(StrategyRegistry::new()), config)
    }

    /// Create a new runtime with a pre-populated registry
    pub fn with_registry(registry: Arc<StrategyRegistry>, config: RuntimeConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        let executor = FlowExecutor::with_config(registry.clone(), config.executor)
            .with_event_bus(event_bus.clone());

        Self {
            registry,
            executor,
            event_bus,
            flows: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Store a flow so it can be run by id
    pub async fn register_flow(&self, flow: ActionFlow) {
        let mut flows = self.flows.write().await;
        tracing::debug!("Registering flow {}", flow.id);
        flows.insert(flow.id.clone(), flow);
    }

    /// Execute a registered flow by id
    pub async fn execute_flow(
        &self,
        flow_id: &str,
        ctx: &mut ExecutionContext,
    ) -> Result<Vec<NodeExecutionResult>, FlowError> {
        let flows = self.flows.read().await;
        let flow = flows
            .get(flow_id)
            .ok_or_else(|| WorkflowError::NotFound(flow_id.to_string()))?;

        self.executor.execute_flow(flow, ctx).await
    }

    /// Execute a flow directly (without registration)
    pub async fn execute(
        &self,
        flow: &ActionFlow,
        ctx: &mut ExecutionContext,
    ) -> Result<Vec<NodeExecutionResult>, FlowError> {
        self.executor.execute_flow(flow, ctx).await
    }

    pub fn validate(&self, flow: &ActionFlow) -> ValidationReport {
        FlowValidator::new(&self.registry).validate(flow)
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for FlowRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub executor: ExecutorConfig,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            event_buffer_size: 1000,
        }
    }
}
