use actioncore::{
    params_from, ActionNode, ExecutionContext, MessageType, NodeError, NodeStrategy, Params, Port,
    PortType, PortValues, Value,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShowMessageParams {
    pub message_type: MessageType,
    pub content: String,
    /// How long the notification stays visible, in milliseconds
    pub duration: f64,
}

impl Default for ShowMessageParams {
    fn default() -> Self {
        Self {
            message_type: MessageType::Info,
            content: String::new(),
            duration: 3000.0,
        }
    }
}

/// Show-message strategy: dispatches a notification to the host
pub struct ShowMessageStrategy;

#[async_trait]
impl NodeStrategy for ShowMessageStrategy {
    fn node_type(&self) -> &str {
        "showMessage"
    }

    fn label(&self) -> &str {
        "Show Message"
    }

    fn category(&self) -> &str {
        "ui"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let mut params: ShowMessageParams = node.params_as()?;
        if let Some(content) = inputs.get("content").filter(|v| !v.is_null()) {
            params.content = content.to_display_string();
        }
        if params.content.trim().is_empty() {
            return Err(NodeError::MissingInput("content".to_string()));
        }

        let delivered = match ctx.services() {
            Some(services) => {
                services.show_message(
                    params.message_type,
                    &params.content,
                    params.duration.max(0.0) as u64,
                );
                true
            }
            None => {
                tracing::warn!(
                    "No notification service available; dropping {} message: {}",
                    params.message_type,
                    params.content
                );
                false
            }
        };

        let mut outputs = PortValues::new();
        outputs.insert("success".to_string(), Value::Bool(delivered));
        outputs.insert(
            "messageType".to_string(),
            Value::from(params.message_type.as_str()),
        );
        outputs.insert("content".to_string(), Value::String(params.content));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("content", PortType::String).with_name("Content"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("success", PortType::Boolean).with_name("Success"),
            Port::new("messageType", PortType::String).with_name("Message Type"),
            Port::new("content", PortType::String).with_name("Content"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&ShowMessageParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        let params: ShowMessageParams = match node.params_as() {
            Ok(params) => params,
            Err(e) => return vec![e.to_string()],
        };

        let mut errors = Vec::new();
        let content_wired = node.inputs.iter().any(|port| port.id == "content");
        if params.content.trim().is_empty() && !content_wired {
            errors.push("Message content is required".to_string());
        }
        if params.duration < 0.0 {
            errors.push(format!("Duration must not be negative (got {})", params.duration));
        }
        errors
    }
}
