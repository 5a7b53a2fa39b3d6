use actioncore::{
    params_from, ActionNode, ExecutionContext, NodeError, NodeStrategy, Params, Port, PortType,
    PortValues, Value,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetVariableParams {
    pub variable_name: String,
    pub value: Value,
}

/// Turn strings that look like booleans or numbers into those types;
/// everything else is returned unchanged.
pub fn coerce_value(value: Value) -> Value {
    let coerced = match value.as_str().map(str::trim) {
        Some("true") => Some(Value::Bool(true)),
        Some("false") => Some(Value::Bool(false)),
        Some(text) if !text.is_empty() => {
            let number = Value::from(text).to_number();
            number.is_finite().then_some(Value::Number(number))
        }
        _ => None,
    };
    coerced.unwrap_or(value)
}

/// Writes a value into the run's variables and the host's variable store
pub struct SetVariableStrategy;

#[async_trait]
impl NodeStrategy for SetVariableStrategy {
    fn node_type(&self) -> &str {
        "setVariable"
    }

    fn label(&self) -> &str {
        "Set Variable"
    }

    fn category(&self) -> &str {
        "data"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let params: SetVariableParams = node.params_as()?;
        if params.variable_name.trim().is_empty() {
            return Err(NodeError::InvalidParams("Variable name is required".to_string()));
        }

        let raw = inputs.get("value").cloned().unwrap_or(params.value);
        let value = coerce_value(raw);

        tracing::debug!("Setting variable {} = {:?}", params.variable_name, value);
        ctx.set_variable(params.variable_name.clone(), value.clone());
        if let Some(services) = ctx.services() {
            services.set_variable(&params.variable_name, &value);
        }

        let mut outputs = PortValues::new();
        outputs.insert("variableName".to_string(), Value::String(params.variable_name));
        outputs.insert("value".to_string(), value);
        outputs.insert("success".to_string(), Value::Bool(true));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("value", PortType::Any).with_name("Value"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("value", PortType::Any).with_name("Value"),
            Port::new("success", PortType::Boolean).with_name("Success"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&SetVariableParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        match node.params_as::<SetVariableParams>() {
            Ok(params) if params.variable_name.trim().is_empty() => {
                vec!["Variable name is required".to_string()]
            }
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        }
    }
}
