use crate::executor::wire_inputs;
use crate::registry::StrategyRegistry;
use actioncore::{ActionEdge, ActionFlow, WorkflowError};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Walker};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Problems found by [`FlowValidator`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, error: impl ToString) {
        self.errors.push(error.to_string());
    }
}

/// Static pre-flight check of a flow; never executes anything
pub struct FlowValidator<'r> {
    registry: &'r StrategyRegistry,
}

impl<'r> FlowValidator<'r> {
    pub fn new(registry: &'r StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, flow: &ActionFlow) -> ValidationReport {
        let mut report = ValidationReport::default();

        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut node_to_index: HashMap<&str, NodeIndex> = HashMap::new();

        for node in &flow.nodes {
            if node_to_index.contains_key(node.id.as_str()) {
                report.error(WorkflowError::DuplicateNode(node.id.clone()));
                continue;
            }
            let idx = graph.add_node(node.id.as_str());
            node_to_index.insert(node.id.as_str(), idx);
        }

        for edge in &flow.edges {
            let from = node_to_index.get(edge.source.as_str());
            let to = node_to_index.get(edge.target.as_str());
            match (from, to) {
                (Some(from), Some(to)) => {
                    graph.add_edge(*from, *to, ());
                }
                _ => report.error(WorkflowError::InvalidConnection(format!(
                    "edge {} connects unknown nodes {} -> {}",
                    edge.id, edge.source, edge.target
                ))),
            }
        }

        if is_cyclic_directed(&graph) {
            report.error("Circular dependency detected");
        }

        let entries: Vec<NodeIndex> = match flow.entry_node_id.as_deref() {
            Some(entry_id) => match node_to_index.get(entry_id) {
                Some(idx) => vec![*idx],
                None => {
                    report.error(WorkflowError::NodeNotFound(format!("entry node {}", entry_id)));
                    Vec::new()
                }
            },
            None => graph
                .node_indices()
                .filter(|idx| {
                    graph
                        .neighbors_directed(*idx, petgraph::Direction::Incoming)
                        .next()
                        .is_none()
                })
                .collect(),
        };

        if entries.is_empty() && flow.entry_node_id.is_none() {
            report.error(WorkflowError::NoEntryNodes);
        }

        let mut reachable: HashSet<NodeIndex> = HashSet::new();
        for entry in &entries {
            reachable.extend(Bfs::new(&graph, *entry).iter(&graph));
        }
        if !entries.is_empty() {
            for idx in graph.node_indices() {
                if !reachable.contains(&idx) {
                    report
                        .warnings
                        .push(format!("Node {} is unreachable from the entry nodes", graph[idx]));
                }
            }
        }

        for node in flow.nodes.iter().filter(|n| !n.disabled) {
            match self.registry.resolve(&node.node_type) {
                Ok(strategy) => {
                    let incoming: Vec<&ActionEdge> = flow
                        .edges
                        .iter()
                        .filter(|edge| edge.target == node.id)
                        .collect();
                    for error in strategy.validate(&wire_inputs(node, &incoming)).errors {
                        report.errors.push(format!("{}: {}", node.id, error));
                    }
                }
                Err(_) => report.error(format!(
                    "{}: {}",
                    node.id,
                    WorkflowError::UnknownNodeType(node.node_type.clone())
                )),
            }
        }

        report
    }
}
