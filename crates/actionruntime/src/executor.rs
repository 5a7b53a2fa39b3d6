use crate::condition;
use crate::registry::StrategyRegistry;
use actioncore::{
    ActionEdge, ActionFlow, ActionNode, EventBus, ExecutionContext, ExecutionEvent, ExecutionId,
    FlowError, NodeError, NodeExecutionResult, NodeStrategy, Port, PortType, PortValues,
    WorkflowError,
};
use chrono::Utc;
use futures::future::{join_all, Future};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Configuration for the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on nodes in flight within one batch; 0 means unbounded
    pub max_concurrency: usize,
    /// Run each strategy's `validate` before executing its node
    pub validate_nodes: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 0,
            validate_nodes: true,
        }
    }
}

/// Executes action flows batch by batch, running every ready node of a batch
/// concurrently
pub struct FlowExecutor {
    registry: Arc<StrategyRegistry>,
    config: ExecutorConfig,
    event_bus: Option<Arc<EventBus>>,
}

impl FlowExecutor {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self::with_config(registry, ExecutorConfig::default())
    }

    pub fn with_config(registry: Arc<StrategyRegistry>, config: ExecutorConfig) -> Self {
        Self {
            registry,
            config,
            event_bus: None,
        }
    }

    /// Publish execution events on `event_bus`
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// Run `flow` to completion and return one result per attempted node,
    /// ordered by batch and then by position within the batch.
    ///
    /// Only structural problems (no entry nodes, a stalled frontier) and
    /// cancellation fail the run; node failures are reported in the results.
    pub async fn execute_flow(
        &self,
        flow: &ActionFlow,
        ctx: &mut ExecutionContext,
    ) -> Result<Vec<NodeExecutionResult>, FlowError> {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();

        tracing::info!("Starting flow execution: {} ({})", flow.id, flow.name);

        let result = self.run(flow, ctx, execution_id).await;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        match &result {
            Ok(results) => {
                let succeeded = results.iter().filter(|r| r.success).count();
                tracing::info!(
                    "Flow {} finished in {}ms: {}/{} nodes succeeded",
                    flow.id,
                    duration_ms,
                    succeeded,
                    results.len()
                );
            }
            Err(e) => tracing::error!("Flow {} failed after {}ms: {}", flow.id, duration_ms, e),
        }

        self.emit(ExecutionEvent::FlowCompleted {
            execution_id,
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        result
    }

    async fn run(
        &self,
        flow: &ActionFlow,
        ctx: &mut ExecutionContext,
        execution_id: ExecutionId,
    ) -> Result<Vec<NodeExecutionResult>, FlowError> {
        let node_map: HashMap<&str, &ActionNode> =
            flow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut edges_by_source: HashMap<&str, Vec<&ActionEdge>> = HashMap::new();
        let mut edges_by_target: HashMap<&str, Vec<&ActionEdge>> = HashMap::new();
        for edge in &flow.edges {
            if !node_map.contains_key(edge.source.as_str()) {
                tracing::warn!("Edge {} starts at unknown node {}, ignoring", edge.id, edge.source);
                continue;
            }
            edges_by_source.entry(edge.source.as_str()).or_default().push(edge);
            edges_by_target.entry(edge.target.as_str()).or_default().push(edge);
        }

        let mut queue = self.find_entry_nodes(flow, &node_map, &edges_by_target)?;
        let mut executed: HashSet<&str> = HashSet::new();
        let mut results = Vec::new();

        self.emit(ExecutionEvent::FlowStarted {
            execution_id,
            flow_id: flow.id.clone(),
            entry_nodes: queue.iter().map(|id| id.to_string()).collect(),
            timestamp: Utc::now(),
        });

        while !queue.is_empty() {
            if ctx.is_cancelled() {
                tracing::warn!("Flow {} cancelled with {} nodes pending", flow.id, queue.len());
                return Err(FlowError::Cancelled);
            }

            let ready: Vec<&str> = queue
                .iter()
                .copied()
                .filter(|id| Self::dependencies_met(id, &edges_by_target, &executed))
                .collect();

            if ready.is_empty() {
                return Err(WorkflowError::CircularDependency {
                    pending: queue.iter().map(|id| id.to_string()).collect(),
                }
                .into());
            }

            tracing::debug!("Executing batch of {} nodes: {:?}", ready.len(), ready);

            let batch = {
                let ctx: &ExecutionContext = ctx;
                let empty = Vec::new();
                let futures = ready.iter().map(|id| {
                    let incoming = edges_by_target.get(id).unwrap_or(&empty);
                    self.execute_node(node_map[id], incoming, ctx, execution_id)
                });
                self.join_batch(futures).await
            };

            for (id, result) in ready.iter().zip(batch) {
                executed.insert(*id);
                queue.retain(|queued| queued != id);
                if !node_map[id].disabled {
                    ctx.record_outputs(*id, result.outputs.clone());
                }
                results.push(result);
            }

            for id in &ready {
                let Some(outgoing) = edges_by_source.get(id) else {
                    continue;
                };
                for edge in outgoing {
                    if let Some(cond) = edge.condition.as_deref() {
                        if !condition::evaluate(cond, ctx) {
                            tracing::debug!(
                                "Edge {} not taken: condition `{}` is false",
                                edge.id,
                                cond
                            );
                            self.emit(ExecutionEvent::EdgeSkipped {
                                execution_id,
                                edge_id: edge.id.clone(),
                                source: edge.source.clone(),
                                target: edge.target.clone(),
                                timestamp: Utc::now(),
                            });
                            continue;
                        }
                    }

                    let Some(&target) = node_map.get(edge.target.as_str()) else {
                        tracing::warn!("Edge {} points at unknown node {}", edge.id, edge.target);
                        continue;
                    };
                    let target = target.id.as_str();
                    if !executed.contains(target) && !queue.contains(&target) {
                        queue.push(target);
                    }
                }
            }
        }

        Ok(results)
    }

    /// The explicit entry node if set, otherwise every node without incoming
    /// edges
    fn find_entry_nodes<'a>(
        &self,
        flow: &'a ActionFlow,
        node_map: &HashMap<&str, &'a ActionNode>,
        edges_by_target: &HashMap<&str, Vec<&ActionEdge>>,
    ) -> Result<Vec<&'a str>, WorkflowError> {
        if let Some(entry_id) = flow.entry_node_id.as_deref() {
            return match node_map.get(entry_id) {
                Some(&node) => Ok(vec![node.id.as_str()]),
                None => {
                    tracing::warn!("Entry node {} not found in flow {}", entry_id, flow.id);
                    Err(WorkflowError::NoEntryNodes)
                }
            };
        }

        let entries: Vec<&str> = flow
            .nodes
            .iter()
            .filter(|n| !edges_by_target.contains_key(n.id.as_str()))
            .map(|n| n.id.as_str())
            .collect();

        if entries.is_empty() {
            // Every node has a predecessor, so the graph must contain a cycle.
            if !flow.nodes.is_empty() {
                return Err(WorkflowError::CircularDependency {
                    pending: flow.nodes.iter().map(|n| n.id.clone()).collect(),
                });
            }
            return Err(WorkflowError::NoEntryNodes);
        }
        Ok(entries)
    }

    fn dependencies_met(
        node_id: &str,
        edges_by_target: &HashMap<&str, Vec<&ActionEdge>>,
        executed: &HashSet<&str>,
    ) -> bool {
        edges_by_target.get(node_id).map_or(true, |incoming| {
            incoming.iter().all(|e| executed.contains(e.source.as_str()))
        })
    }

    /// Await every future of a batch, keeping results in submission order
    async fn join_batch<F>(&self, futures: impl Iterator<Item = F>) -> Vec<NodeExecutionResult>
    where
        F: Future<Output = NodeExecutionResult>,
    {
        match self.config.max_concurrency {
            0 => join_all(futures).await,
            limit => stream::iter(futures).buffered(limit).collect().await,
        }
    }

    async fn execute_node(
        &self,
        node: &ActionNode,
        incoming: &[&ActionEdge],
        ctx: &ExecutionContext,
        execution_id: ExecutionId,
    ) -> NodeExecutionResult {
        if node.disabled {
            tracing::debug!("Node {} is disabled, skipping", node.id);
            self.emit(ExecutionEvent::NodeSkipped {
                execution_id,
                node_id: node.id.clone(),
                timestamp: Utc::now(),
            });
            return NodeExecutionResult::skipped(node.id.clone());
        }

        self.emit(ExecutionEvent::NodeStarted {
            execution_id,
            node_id: node.id.clone(),
            node_type: node.node_type.clone(),
            timestamp: Utc::now(),
        });

        let start = Instant::now();
        let outcome = self.run_strategy(node, incoming, ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(outputs) => {
                tracing::info!("Node {} completed in {}ms", node.id, duration_ms);
                self.emit(ExecutionEvent::NodeCompleted {
                    execution_id,
                    node_id: node.id.clone(),
                    outputs: outputs.clone(),
                    duration_ms,
                    timestamp: Utc::now(),
                });
                NodeExecutionResult::succeeded(node.id.clone(), outputs, duration_ms)
            }
            Err(e) => {
                tracing::warn!("Node {} failed: {}", node.id, e);
                self.emit(ExecutionEvent::NodeFailed {
                    execution_id,
                    node_id: node.id.clone(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                NodeExecutionResult::failed(node.id.clone(), &e, duration_ms)
            }
        }
    }

    async fn run_strategy(
        &self,
        node: &ActionNode,
        incoming: &[&ActionEdge],
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let strategy = self
            .registry
            .resolve(&node.node_type)
            .map_err(|_| NodeError::UnknownNodeType(node.node_type.clone()))?;

        if self.config.validate_nodes {
            let validation = strategy.validate(&wire_inputs(node, incoming));
            if !validation.valid {
                return Err(NodeError::Validation(validation.errors));
            }
        }

        let inputs = resolve_inputs(node, incoming, ctx, strategy.as_ref());

        AssertUnwindSafe(strategy.execute(node, inputs, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(NodeError::ExecutionFailed(panic_message(panic))))
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }
}

/// Declare an input port for every port fed by an incoming data edge, so
/// param checks accept values that only arrive at run time.
pub(crate) fn wire_inputs<'n>(node: &'n ActionNode, incoming: &[&ActionEdge]) -> Cow<'n, ActionNode> {
    let mut missing: Vec<&str> = incoming
        .iter()
        .filter_map(|edge| {
            let source_port = edge.source_port.as_deref()?;
            Some(edge.target_port.as_deref().unwrap_or(source_port))
        })
        .filter(|port| !node.inputs.iter().any(|input| input.id == *port))
        .collect();
    if missing.is_empty() {
        return Cow::Borrowed(node);
    }
    missing.sort_unstable();
    missing.dedup();

    let mut wired = node.clone();
    wired
        .inputs
        .extend(missing.into_iter().map(|port| Port::new(port, PortType::Any)));
    Cow::Owned(wired)
}

/// Copy upstream outputs along incoming edges, then fill declared defaults.
fn resolve_inputs(
    node: &ActionNode,
    incoming: &[&ActionEdge],
    ctx: &ExecutionContext,
    strategy: &dyn NodeStrategy,
) -> PortValues {
    let mut inputs = PortValues::new();

    for edge in incoming {
        let Some(source_port) = edge.source_port.as_deref() else {
            continue;
        };
        let Some(value) = ctx
            .node_outputs(&edge.source)
            .and_then(|outputs| outputs.get(source_port))
        else {
            continue;
        };
        let target_port = edge.target_port.as_deref().unwrap_or(source_port);
        inputs.insert(target_port.to_string(), value.clone());
    }

    for port in node.inputs.iter().chain(strategy.input_ports().iter()) {
        if let Some(default) = &port.default_value {
            inputs
                .entry(port.id.clone())
                .or_insert_with(|| default.clone());
        }
    }

    inputs
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("strategy panicked: {}", detail)
}
