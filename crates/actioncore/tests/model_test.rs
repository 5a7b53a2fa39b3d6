// crates/actioncore/tests/model_test.rs

use actioncore::{
    ActionFlow, ActionNode, EventBus, ExecutionContext, ExecutionEvent, ExecutionId, NodeError,
    NodeExecutionResult, PortType, PortValues, Value,
};
use serde::Deserialize;
use std::collections::HashMap;

const FLOW_JSON: &str = r#"{
    "id": "checkout",
    "name": "Checkout",
    "entryNodeId": "fetch",
    "nodes": [
        {
            "id": "fetch",
            "type": "httpRequest",
            "label": "Fetch cart",
            "params": { "url": "https://example.test/cart", "timeout": 5000 },
            "outputs": [{ "id": "response", "name": "Response", "type": "object" }]
        },
        {
            "id": "notify",
            "type": "showMessage",
            "label": "Notify",
            "params": { "content": "done" },
            "inputs": [
                { "id": "content", "name": "Content", "type": "string", "defaultValue": "fallback" }
            ],
            "disabled": true
        }
    ],
    "edges": [
        {
            "id": "e1",
            "source": "fetch",
            "target": "notify",
            "sourcePort": "status",
            "targetPort": "content",
            "condition": "nodeOutputs.fetch.success === true"
        }
    ]
}"#;

#[test]
fn test_flow_deserializes_from_camel_case_json() {
    let flow: ActionFlow = serde_json::from_str(FLOW_JSON).unwrap();

    assert_eq!(flow.entry_node_id.as_deref(), Some("fetch"));
    assert_eq!(flow.nodes.len(), 2);

    let notify = flow.find_node("notify").unwrap();
    assert!(notify.disabled);
    assert_eq!(notify.inputs[0].port_type, PortType::String);
    assert_eq!(notify.inputs[0].default_value, Some(Value::from("fallback")));

    let edge = &flow.edges[0];
    assert_eq!(edge.source_port.as_deref(), Some("status"));
    assert_eq!(
        edge.condition.as_deref(),
        Some("nodeOutputs.fetch.success === true")
    );
}

#[derive(Debug, Deserialize)]
struct FetchParams {
    url: String,
    timeout: u64,
    #[serde(default)]
    method: Option<String>,
}

#[test]
fn test_params_decode_into_typed_struct() {
    let flow: ActionFlow = serde_json::from_str(FLOW_JSON).unwrap();
    let params: FetchParams = flow.find_node("fetch").unwrap().params_as().unwrap();

    assert_eq!(params.url, "https://example.test/cart");
    assert_eq!(params.timeout, 5000);
    assert!(params.method.is_none());
}

#[test]
fn test_params_decode_reports_invalid_shape() {
    let node = ActionNode::new("n", "httpRequest").with_param("timeout", "soon");
    let err = node.params_as::<FetchParams>().unwrap_err();
    assert!(matches!(err, NodeError::InvalidParams(_)));
}

#[test]
fn test_context_lookup_paths() {
    let mut user = HashMap::new();
    user.insert("name".to_string(), Value::from("ada"));

    let mut ctx = ExecutionContext::new("flow-1")
        .with_variable("user", Value::Object(user))
        .with_variable("count", 3i64)
        .with_event_data(serde_json::json!({ "click": { "x": 10 } }));

    let mut outputs = PortValues::new();
    outputs.insert("status".to_string(), Value::Number(200.0));
    ctx.record_outputs("fetch", outputs);

    assert_eq!(ctx.lookup("flowId"), Some(Value::from("flow-1")));
    assert_eq!(ctx.lookup("variables.user.name"), Some(Value::from("ada")));
    assert_eq!(ctx.lookup_variable("count"), Some(Value::Number(3.0)));
    assert_eq!(ctx.lookup("nodeOutputs.fetch.status"), Some(Value::Number(200.0)));
    assert_eq!(ctx.lookup("eventData.click.x"), Some(Value::Number(10.0)));
    assert_eq!(ctx.lookup("nodeOutputs.missing.status"), None);
    assert_eq!(ctx.lookup("somethingElse"), None);
}

#[test]
fn test_result_serializes_without_empty_fields() {
    let result = NodeExecutionResult::skipped("n1");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["nodeId"], "n1");
    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    assert!(json.get("duration").is_none());

    let failed = NodeExecutionResult::failed("n2", &NodeError::UnknownNodeType("x".into()), 4);
    assert_eq!(failed.error.as_deref(), Some("Unknown node type: x"));
    assert_eq!(failed.duration, Some(4));
}

#[tokio::test]
async fn test_event_bus_with_zero_capacity_still_delivers() {
    let bus = EventBus::new(0);
    let mut events = bus.subscribe();
    let execution_id = ExecutionId::new_v4();

    bus.emit(ExecutionEvent::NodeSkipped {
        execution_id,
        node_id: "n1".to_string(),
        timestamp: chrono::Utc::now(),
    });

    assert_eq!(events.recv().await.unwrap().execution_id(), execution_id);
}
