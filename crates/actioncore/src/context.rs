use crate::{FlowId, NodeId, Value};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Port id -> value map used for node inputs and outputs.
pub type PortValues = HashMap<String, Value>;

/// Side-effect hooks supplied by the host application.
///
/// Every hook defaults to a no-op so hosts only implement what they surface.
pub trait ExecutionServices: Send + Sync {
    /// Mirror a variable write into an external store.
    fn set_variable(&self, _name: &str, _value: &Value) {}

    /// Navigate to `url`.
    fn navigate(&self, _url: &str, _options: NavigateOptions) {}

    /// Show a user-facing notification.
    fn show_message(&self, _message_type: MessageType, _content: &str, _duration_ms: u64) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    pub open_in_new_tab: bool,
    pub replace: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Info => "info",
            MessageType::Success => "success",
            MessageType::Warning => "warning",
            MessageType::Error => "error",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run mutable state shared by every node in the run.
///
/// `variables` may be written by strategies while their batch is in flight;
/// `node_outputs` is only written by the executor between batches.
pub struct ExecutionContext {
    pub flow_id: FlowId,
    variables: DashMap<String, Value>,
    node_outputs: HashMap<NodeId, PortValues>,
    pub event_data: Option<Value>,
    services: Option<Arc<dyn ExecutionServices>>,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn new(flow_id: impl Into<String>) -> Self {
        Self {
            flow_id: flow_id.into(),
            variables: DashMap::new(),
            node_outputs: HashMap::new(),
            event_data: None,
            services: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_variables<I, K, V>(self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in variables {
            self.variables.insert(name.into(), value.into());
        }
        self
    }

    pub fn with_variable(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_event_data(mut self, data: impl Into<Value>) -> Self {
        self.event_data = Some(data.into());
        self
    }

    pub fn with_services(mut self, services: Arc<dyn ExecutionServices>) -> Self {
        self.services = Some(services);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).map(|entry| entry.value().clone())
    }

    pub fn set_variable(&self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Snapshot of all variables.
    pub fn variables(&self) -> HashMap<String, Value> {
        self.variables
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn node_outputs(&self, node_id: &str) -> Option<&PortValues> {
        self.node_outputs.get(node_id)
    }

    /// Store a completed node's outputs for downstream input resolution.
    pub fn record_outputs(&mut self, node_id: impl Into<String>, outputs: PortValues) {
        self.node_outputs.insert(node_id.into(), outputs);
    }

    pub fn services(&self) -> Option<&Arc<dyn ExecutionServices>> {
        self.services.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Dotted-path lookup from the context root: `flowId`, `variables`,
    /// `nodeOutputs` or `eventData`, then into the value itself.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        match root {
            "flowId" => match segments.next() {
                None => Some(Value::String(self.flow_id.clone())),
                Some(_) => None,
            },
            "variables" => self.lookup_variable_path(segments),
            "nodeOutputs" => {
                let Some(node_id) = segments.next() else {
                    return Some(Value::Object(
                        self.node_outputs
                            .iter()
                            .map(|(id, outputs)| (id.clone(), Value::Object(outputs.clone())))
                            .collect(),
                    ));
                };
                let outputs = self.node_outputs.get(node_id)?;
                let Some(port) = segments.next() else {
                    return Some(Value::Object(outputs.clone()));
                };
                outputs.get(port)?.get_path(segments).cloned()
            }
            "eventData" => self.event_data.as_ref()?.get_path(segments).cloned(),
            _ => None,
        }
    }

    /// Dotted-path lookup inside the variables (`a.b` reads `variables["a"].b`).
    pub fn lookup_variable(&self, path: &str) -> Option<Value> {
        self.lookup_variable_path(path.split('.'))
    }

    fn lookup_variable_path<'a>(&self, mut segments: impl Iterator<Item = &'a str>) -> Option<Value> {
        let Some(name) = segments.next() else {
            return Some(Value::Object(self.variables()));
        };
        let entry = self.variables.get(name)?;
        entry.value().get_path(segments).cloned()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("flow_id", &self.flow_id)
            .field("variables", &self.variables())
            .field("node_outputs", &self.node_outputs)
            .field("event_data", &self.event_data)
            .field("has_services", &self.services.is_some())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
