use actioncore::{
    params_from, ActionNode, ExecutionContext, NodeError, NodeStrategy, Params, Port, PortType,
    PortValues, Value,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const LEVELS: &[&str] = &["debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogParams {
    pub message: String,
    pub level: String,
}

impl Default for LogParams {
    fn default() -> Self {
        Self {
            message: String::new(),
            level: "info".to_string(),
        }
    }
}

/// Logs a message and passes its inputs through unchanged
pub struct LogStrategy;

#[async_trait]
impl NodeStrategy for LogStrategy {
    fn node_type(&self) -> &str {
        "log"
    }

    fn label(&self) -> &str {
        "Log"
    }

    fn category(&self) -> &str {
        "debug"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        _ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let mut params: LogParams = node.params_as()?;
        if let Some(message) = inputs.get("message").filter(|v| !v.is_null()) {
            params.message = message.to_display_string();
        }

        match params.level.as_str() {
            "debug" => tracing::debug!(node = %node.id, "{}", params.message),
            "warn" => tracing::warn!(node = %node.id, "{}", params.message),
            "error" => tracing::error!(node = %node.id, "{}", params.message),
            _ => tracing::info!(node = %node.id, "{}", params.message),
        }
        for (key, value) in &inputs {
            tracing::debug!("  {}: {:?}", key, value);
        }

        let mut outputs = inputs;
        outputs.insert("message".to_string(), Value::String(params.message));
        outputs.insert("success".to_string(), Value::Bool(true));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("message", PortType::Any).with_name("Message"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("message", PortType::String).with_name("Message"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&LogParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        match node.params_as::<LogParams>() {
            Ok(params) if !LEVELS.contains(&params.level.as_str()) => {
                vec![format!("Unknown log level: {}", params.level)]
            }
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        }
    }
}
