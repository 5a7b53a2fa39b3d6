use actioncore::{
    params_from, ActionNode, ExecutionContext, NavigateOptions, NodeError, NodeStrategy, Params,
    Port, PortType, PortValues, Value,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base used to resolve app-relative paths; never part of the output.
const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigateParams {
    pub path: String,
    pub query: BTreeMap<String, Value>,
    pub open_in_new_tab: bool,
    pub replace: bool,
}

/// Navigate strategy: hands the target URL to the host's navigation hook
pub struct NavigateStrategy;

#[async_trait]
impl NodeStrategy for NavigateStrategy {
    fn node_type(&self) -> &str {
        "navigate"
    }

    fn label(&self) -> &str {
        "Navigate"
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
        let mut params: NavigateParams = node.params_as()?;
        if let Some(path) = inputs.get("path").and_then(Value::as_str) {
            params.path = path.to_string();
        }
        if let Some(Value::Object(query)) = inputs.get("query") {
            params.query.extend(query.clone());
        }

        let url = build_url(&params.path, &params.query)?;
        let options = NavigateOptions {
            open_in_new_tab: params.open_in_new_tab,
            replace: params.replace,
        };

        let success = match ctx.services() {
            Some(services) => {
                tracing::info!("Navigating to {}", url);
                services.navigate(&url, options);
                true
            }
            None => {
                tracing::warn!("No navigation service available; cannot open {}", url);
                false
            }
        };

        let mut outputs = PortValues::new();
        outputs.insert("success".to_string(), Value::Bool(success));
        outputs.insert("url".to_string(), Value::String(url));
        Ok(outputs)
    }

    fn input_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("exec"),
            Port::new("path", PortType::String).with_name("Path"),
            Port::new("query", PortType::Object).with_name("Query"),
        ]
    }

    fn output_ports(&self) -> Vec<Port> {
        vec![
            Port::exec("next"),
            Port::new("success", PortType::Boolean).with_name("Success"),
            Port::new("url", PortType::String).with_name("URL"),
        ]
    }

    fn default_params(&self) -> Params {
        params_from(&NavigateParams::default())
    }

    fn validate_params(&self, node: &ActionNode) -> Vec<String> {
        match node.params_as::<NavigateParams>() {
            Ok(params) if params.path.trim().is_empty() => vec!["Path is required".to_string()],
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        }
    }
}

/// Append `query` to `path` as URL search params, keeping any query string
/// or fragment already on the path. Null values are dropped.
pub fn build_url(path: &str, query: &BTreeMap<String, Value>) -> Result<String, NodeError> {
    let pairs: Vec<(&str, String)> = query
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.as_str(), value.to_display_string()))
        .collect();
    if pairs.is_empty() {
        return Ok(path.to_string());
    }

    let (mut url, absolute) = match Url::parse(path) {
        Ok(url) => (url, true),
        Err(_) => {
            let url = Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(path))
                .map_err(|e| {
                    NodeError::InvalidParams(format!("Invalid navigation path '{}': {}", path, e))
                })?;
            (url, false)
        }
    };

    url.query_pairs_mut().extend_pairs(pairs);

    if absolute {
        return Ok(url.to_string());
    }

    let mut relative = url.path().to_string();
    if let Some(query) = url.query() {
        relative.push('?');
        relative.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        relative.push('#');
        relative.push_str(fragment);
    }
    Ok(relative)
}
