use actioncore::{
    params_from, ActionNode, ExecutionContext, NodeError, NodeStrategy, Params, Port, PortType,
    PortValues, Value,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::time::{timeout, Duration};

const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRequestParams {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, Value>,
    pub body: Option<Value>,
    /// Milliseconds before the request is abandoned
    pub timeout: u64,
}

impl Default for HttpRequestParams {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
            timeout: 30_000,
        }
    }
}

impl HttpRequestParams {
    /// Connected inputs take precedence over the configured params
    fn apply_inputs(&mut self, inputs: &PortValues) {
        if let Some(url) = inputs.get("url").and_then(Value::as_str) {
            self.url = url.to_string();
        }
        if let Some(method) = inputs.get("method").and_then(Value::as_str) {
            self.method = method.to_string();
        }
        if let Some(Value::Object(headers)) = inputs.get("headers") {
            self.headers.extend(headers.clone());
        }
        if let Some(body) = inputs.get("body") {
            self.body = Some(body.clone());
        }
    }
}

/// HTTP request strategy
pub struct HttpRequestStrategy {
    client: reqwest::Client,
}

impl HttpRequestStrategy {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpRequestStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStrategy for HttpRequestStrategy {
    fn node_type(&self) -> &str {
        "httpRequest"
    }

    fn label(&self) -> &str {
        "HTTP Request"
    }

    fn category(&self) -> &str {
        "network"
    }

    async fn execute(
        &self,
        node: &ActionNode,
        inputs: PortValues,
        ctx: &ExecutionContext,
    ) -> Result<PortValues, NodeError> {
        let mut params: HttpRequestParams = node.params_as()?;
        params.apply_inputs(&inputs);
        if params.url.trim().is_empty() {
            return Err(NodeError::MissingInput("url".to_string()));
        }

        let method = reqwest::Method::from_bytes(params.method.to_uppercase().as_bytes())
            .map_err(|_| NodeError::InvalidParams(format!("Unsupported method: {}", params.method)))?;

        tracing::info!("{} {}", method, params.url);

        let mut request = self.client.request(method, &params.url);
        for (key, value) in &params.headers {
            request = request.header(key.as_str(), value.to_display_string());
        }
        request = match &params.body {
            None | Some(Value::Null) => request,
            Some(Value::String(text)) => request.body(text.clone()),
            Some(other) => request.json(&serde_json::Value::from(other.clone())),
        };

        let send = async {
            let response = request
                .send()
                .await
                .map_err(|e| NodeError::ExecutionFailed(format!("HTTP request failed: {}", e)))?;

            let status = response.status();
            let headers: HashMap<String, Value> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_str().unwrap_or("").to_string())))
                .collect();

            let body_text = response
                .text()
                .await
                .map_err(|e| NodeError::ExecutionFailed(format!("Failed to read response: {}", e)))?;

            Ok::<_, NodeError>((status, headers, body_text))
        };

        let timeout_ms = params.timeout;
        let (status, headers, body_text) = tokio::select! {
            _ = ctx.cancellation().cancelled() => return Err(NodeError::Cancelled),
            outcome = timeout(Duration::from_millis(timeout_ms), send) => {
                outcome.map_err(|_| NodeError::Timeout { ms: timeout_ms })??
            }
        };

        tracing::info!("Response status: {}", status);

        let response = serde_json::from_str::<serde_json::Value>(&body_text)
            .map(Value::from)
            .unwrap_or(Value::String(body_text));

        let mut outputs = PortValues::new();
        outputs.insert("response".to_string(), response);
        outputs.insert("status".to_string(), Value::from(status.as_u16()));
        outputs.insert(
            "statusText".to_string(),
            Value::from(status.canonical_reason().unwrap_or("")),
        );
        outputs.insert("success".to_string(), Value::Bool(status.is_success()));
        outputs.insert("headers".to_string(), Value::Object(headers));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("url", PortType::String).with_name("URL"),
            Port::new("method", PortType::String).with_name("Method"),
            Port::new("headers", PortType::Object).with_name("Headers"),
            Port::new("body", PortType::Any).with_name("Body"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("response", PortType::Any).with_name("Response"),
            Port::new("status", PortType::Number).with_name("Status"),
            Port::new("statusText", PortType::String).with_name("Status Text"),
            Port::new("success", PortType::Boolean).with_name("Success"),
            Port::new("headers", PortType::Object).with_name("Headers"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&HttpRequestParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        let params: HttpRequestParams = match node.params_as() {
            Ok(params) => params,
            Err(e) => return vec![e.to_string()],
        };

        let mut errors = Vec::new();
        let url_wired = node.inputs.iter().any(|port| port.id == "url");
        if params.url.trim().is_empty() && !url_wired {
            errors.push("URL is required".to_string());
        }
        if !SUPPORTED_METHODS.contains(&params.method.to_uppercase().as_str()) {
            errors.push(format!("Unsupported method: {}", params.method));
        }
        if params.timeout == 0 {
            errors.push("Timeout must be greater than zero".to_string());
        }
        errors
    }
}
