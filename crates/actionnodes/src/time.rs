use actioncore::{
    params_from, ActionNode, ExecutionContext, NodeError, NodeStrategy, Params, Port, PortType,
    PortValues, Value,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParams {
    /// Milliseconds to wait
    pub duration: f64,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self { duration: 1000.0 }
    }
}

fn negative_duration(duration: f64) -> String {
    format!("Duration must not be negative (got {})", duration)
}

/// Delay execution for a specified duration
pub struct DelayStrategy;

#[async_trait]
impl NodeStrategy for DelayStrategy {
    fn node_type(&self) -> &str {
        "delay"
    }

    fn label(&self) -> &str {
        "Delay"
    }

    fn category(&self) -> &str {
        "time"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let mut params: DelayParams = node.params_as()?;
        if let Some(duration) = inputs.get("duration").map(Value::to_number) {
            params.duration = duration;
        }
        if !params.duration.is_finite() || params.duration < 0.0 {
            return Err(NodeError::InvalidParams(negative_duration(params.duration)));
        }

        let delay_ms = params.duration as u64;
        tracing::debug!("Delaying for {}ms", delay_ms);

        tokio::select! {
            _ = ctx.cancellation().cancelled() => return Err(NodeError::Cancelled),
            _ = sleep(Duration::from_millis(delay_ms)) => {}
        }

        let mut outputs = PortValues::new();
        outputs.insert("success".to_string(), Value::Bool(true));
        outputs.insert("duration".to_string(), Value::from(delay_ms));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("duration", PortType::Number).with_name("Duration (ms)"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("success", PortType::Boolean).with_name("Success"),
            Port::new("duration", PortType::Number).with_name("Duration (ms)"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&DelayParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        match node.params_as::<DelayParams>() {
            Ok(params) if params.duration < 0.0 => vec![negative_duration(params.duration)],
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        }
    }
}
