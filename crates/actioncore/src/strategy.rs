use crate::{ActionNode, ExecutionContext, NodeError, NodeId, Params, Port, PortValues, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Executable behavior behind one node type
#[async_trait]
pub trait NodeStrategy: Send + Sync {
    /// Unique type identifier (e.g. "httpRequest", "setVariable")
    fn node_type(&self) -> &str;

    /// Human-readable name shown in palettes
    fn label(&self) -> &str;

    fn category(&self) -> &str {
        "general"
    }

    /// Run the node with already-resolved inputs
    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError>;

    fn input_ports(&self) -> Vec<Port> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<Port> {
        Vec::new()
    }

    fn default_params(&self) -> Params {
        Params::new()
    }

    /// Type-specific checks, run after the base checks in [`validate`].
    ///
    /// [`validate`]: NodeStrategy::validate
    fn validate_params(&self, _node: &ActionNode) -> Vec<String> {
        Vec::new()
    }

    /// Validate a node's configuration before it runs
    fn validate(&self, node: &ActionNode) -> ValidationResult {
        let mut errors = validate_base(node);
        errors.extend(self.validate_params(node));
        ValidationResult::from_errors(errors)
    }
}

/// Checks every node must pass regardless of type.
pub fn validate_base(node: &ActionNode) -> Vec<String> {
    let mut errors = Vec::new();
    if node.node_type.trim().is_empty() {
        errors.push("Node type is required".to_string());
    }
    if node.label.trim().is_empty() {
        errors.push("Node label is required".to_string());
    }
    errors
}

/// Encode a typed params struct into the opaque params map.
pub fn params_from<T: Serialize>(params: &T) -> Params {
    match Value::from_serialize(params) {
        Ok(Value::Object(map)) => map,
        _ => Params::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Outcome of one attempted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionResult {
    pub node_id: NodeId,
    pub success: bool,
    pub outputs: PortValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock execution time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl NodeExecutionResult {
    pub fn succeeded(node_id: impl Into<String>, outputs: PortValues, duration_ms: u64) -> Self {
        Self {
            node_id: node_id.into(),
            success: true,
            outputs,
            error: None,
            duration: Some(duration_ms),
        }
    }

    pub fn failed(node_id: impl Into<String>, error: &NodeError, duration_ms: u64) -> Self {
        Self {
            node_id: node_id.into(),
            success: false,
            outputs: PortValues::new(),
            error: Some(error.to_string()),
            duration: Some(duration_ms),
        }
    }

    /// Result for a disabled node: successful, no outputs, strategy untouched.
    pub fn skipped(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            success: true,
            outputs: PortValues::new(),
            error: None,
            duration: None,
        }
    }
}
