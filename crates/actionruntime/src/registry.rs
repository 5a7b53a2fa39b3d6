use actioncore::{NodeStrategy, Params, Port, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;

/// Legacy node-type names still found in older flows.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("action.httpRequest", "httpRequest"),
    ("action.navigate", "navigate"),
    ("action.showMessage", "showMessage"),
    ("action.delay", "delay"),
    ("action.setVariable", "setVariable"),
    ("action.log", "log"),
];

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct StrategyMetadata {
    pub node_type: String,
    pub label: String,
    pub category: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub default_params: Params,
}

/// Registry of available node strategies
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn NodeStrategy>>,
    aliases: HashMap<String, String>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
        }
    }

    /// Register a strategy, replacing any previous one for the same type
    pub fn register(&mut self, strategy: Arc<dyn NodeStrategy>) {
        let node_type = strategy.node_type().to_string();
        if self.strategies.contains_key(&node_type) {
            tracing::warn!("Replacing strategy for node type: {}", node_type);
        } else {
            tracing::info!("Registering node type: {}", node_type);
        }
        self.strategies.insert(node_type, strategy);
    }

    /// Map `alias` onto an already (or later) registered node type
    pub fn register_alias(&mut self, alias: impl Into<String>, node_type: impl Into<String>) {
        self.aliases.insert(alias.into(), node_type.into());
    }

    /// Exact lookup, no alias fallback
    pub fn get_strategy(&self, node_type: &str) -> Result<Arc<dyn NodeStrategy>, WorkflowError> {
        self.strategies
            .get(node_type)
            .cloned()
            .ok_or_else(|| WorkflowError::NoStrategy(node_type.to_string()))
    }

    pub fn has_strategy(&self, node_type: &str) -> bool {
        self.strategies.contains_key(node_type)
    }

    /// Lookup by type, falling back to the alias table
    pub fn resolve(&self, node_type: &str) -> Result<Arc<dyn NodeStrategy>, WorkflowError> {
        if let Some(strategy) = self.strategies.get(node_type) {
            return Ok(strategy.clone());
        }
        match self.aliases.get(node_type) {
            Some(target) => {
                tracing::debug!("Resolved node type alias {} -> {}", node_type, target);
                self.get_strategy(target)
            }
            None => Err(WorkflowError::NoStrategy(node_type.to_string())),
        }
    }

    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.strategies.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn metadata(&self, node_type: &str) -> Option<StrategyMetadata> {
        self.strategies.get(node_type).map(|s| StrategyMetadata {
            node_type: s.node_type().to_string(),
            label: s.label().to_string(),
            category: s.category().to_string(),
            inputs: s.input_ports(),
            outputs: s.output_ports(),
            default_params: s.default_params(),
        })
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
