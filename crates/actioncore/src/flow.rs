use crate::{NodeError, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type FlowId = String;
pub type NodeId = String;

/// Opaque, strategy-specific node parameters.
pub type Params = HashMap<String, Value>;

/// Complete action flow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFlow {
    pub id: FlowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<ActionNode>,
    #[serde(default)]
    pub edges: Vec<ActionEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_node_id: Option<NodeId>,
}

impl ActionFlow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            entry_node_id: None,
        }
    }

    pub fn add_node(&mut self, node: ActionNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn add_edge(&mut self, edge: ActionEdge) {
        self.edges.push(edge);
    }

    /// Connect two nodes with an unconditioned edge between the given ports.
    pub fn connect(
        &mut self,
        source: impl Into<String>,
        source_port: impl Into<String>,
        target: impl Into<String>,
        target_port: impl Into<String>,
    ) {
        let source = source.into();
        let target = target.into();
        let id = format!("{}->{}#{}", source, target, self.edges.len());
        self.edges.push(
            ActionEdge::new(id, source, target).with_ports(source_port, target_port),
        );
    }

    /// Connect two nodes with an edge gated by `condition`.
    pub fn connect_when(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        condition: impl Into<String>,
    ) {
        let source = source.into();
        let target = target.into();
        let id = format!("{}->{}#{}", source, target, self.edges.len());
        self.edges
            .push(ActionEdge::new(id, source, target).with_condition(condition));
    }

    pub fn with_entry(mut self, node_id: impl Into<String>) -> Self {
        self.entry_node_id = Some(node_id.into());
        self
    }

    pub fn find_node(&self, id: &str) -> Option<&ActionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// One typed unit of work in a flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default)]
    pub disabled: bool,
}

impl ActionNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id: id.into(),
            label: node_type.clone(),
            node_type,
            params: Params::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            disabled: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Decode `params` into a strategy's typed parameter struct.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, NodeError> {
        let json = serde_json::to_value(&self.params)
            .map_err(|e| NodeError::InvalidParams(e.to_string()))?;
        serde_json::from_value(json)
            .map_err(|e| NodeError::InvalidParams(format!("{} ({})", e, self.node_type)))
    }
}

/// A named slot for a value on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub port_type: PortType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Port {
    pub fn new(id: impl Into<String>, port_type: PortType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            port_type,
            required: false,
            default_value: None,
        }
    }

    pub fn exec(id: impl Into<String>) -> Self {
        Self::new(id, PortType::Exec)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Control-flow (`exec`) or data-carrying port kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Exec,
    String,
    Number,
    Boolean,
    Object,
    Array,
    #[default]
    Any,
}

/// Directed connection between two node ports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<String>,
    /// Boolean expression evaluated when `source` completes; the edge only
    /// fires when it holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ActionEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_port: None,
            target_port: None,
            condition: None,
            label: None,
        }
    }

    pub fn with_ports(mut self, source_port: impl Into<String>, target_port: impl Into<String>) -> Self {
        self.source_port = Some(source_port.into());
        self.target_port = Some(target_port.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
