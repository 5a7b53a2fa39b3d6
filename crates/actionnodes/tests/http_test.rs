// crates/actionnodes/tests/http_test.rs

use actioncore::{
    ActionFlow, ActionNode, ExecutionContext, NodeError, NodeStrategy, PortValues, Value,
};
use actionnodes::{default_registry, HttpRequestStrategy};
use actionruntime::FlowExecutor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn strategy() -> HttpRequestStrategy {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpRequestStrategy::with_client(client)
}

/// Serve a single canned response, returning the raw request head it received.
async fn serve_once(status_line: &'static str, body: &'static str) -> (SocketAddr, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if received.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&received).to_string()
    });

    (addr, handle)
}

#[tokio::test]
async fn test_get_parses_json_response() {
    let (addr, server) = serve_once("HTTP/1.1 200 OK", r#"{"id":1,"name":"widget"}"#).await;
    let node = ActionNode::new("fetch", "httpRequest")
        .with_param("url", format!("http://{}/items/1", addr))
        .with_param("headers", Value::Object(
            [("x-trace".to_string(), Value::from("abc"))].into_iter().collect(),
        ));

    let outputs = strategy()
        .execute(&node, PortValues::new(), &ExecutionContext::new("http"))
        .await
        .unwrap();

    assert_eq!(outputs.get("status"), Some(&Value::Number(200.0)));
    assert_eq!(outputs.get("statusText"), Some(&Value::from("OK")));
    assert_eq!(outputs.get("success"), Some(&Value::Bool(true)));

    let response = outputs.get("response").and_then(Value::as_object).unwrap();
    assert_eq!(response.get("name"), Some(&Value::from("widget")));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /items/1 HTTP/1.1"));
    assert!(request.to_lowercase().contains("x-trace: abc"));
}

#[tokio::test]
async fn test_error_status_is_not_success() {
    let (addr, _server) = serve_once("HTTP/1.1 404 Not Found", "missing").await;
    let node = ActionNode::new("fetch", "httpRequest")
        .with_param("url", format!("http://{}/nope", addr));

    let outputs = strategy()
        .execute(&node, PortValues::new(), &ExecutionContext::new("http"))
        .await
        .unwrap();

    assert_eq!(outputs.get("status"), Some(&Value::Number(404.0)));
    assert_eq!(outputs.get("success"), Some(&Value::Bool(false)));
    assert_eq!(outputs.get("response"), Some(&Value::from("missing")));
}

#[tokio::test]
async fn test_input_url_overrides_params() {
    let (addr, server) = serve_once("HTTP/1.1 200 OK", "{}").await;
    let node = ActionNode::new("fetch", "httpRequest").with_param("url", "http://127.0.0.1:1/unused");
    let mut inputs = PortValues::new();
    inputs.insert("url".to_string(), Value::from(format!("http://{}/wired", addr)));

    strategy()
        .execute(&node, inputs, &ExecutionContext::new("http"))
        .await
        .unwrap();

    assert!(server.await.unwrap().starts_with("GET /wired"));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });

    let node = ActionNode::new("fetch", "httpRequest")
        .with_param("url", format!("http://{}/slow", addr))
        .with_param("timeout", 200i64);

    let err = strategy()
        .execute(&node, PortValues::new(), &ExecutionContext::new("http"))
        .await
        .unwrap_err();

    assert_eq!(err, NodeError::Timeout { ms: 200 });
}

#[tokio::test]
async fn test_closed_port_is_execution_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let node = ActionNode::new("fetch", "httpRequest")
        .with_param("url", format!("http://{}/", addr));

    let err = strategy()
        .execute(&node, PortValues::new(), &ExecutionContext::new("http"))
        .await
        .unwrap_err();

    assert!(matches!(err, NodeError::ExecutionFailed(ref msg) if msg.starts_with("HTTP request failed")));
}

#[test]
fn test_validation_checks_url_method_and_timeout() {
    let node = ActionNode::new("fetch", "httpRequest")
        .with_param("method", "TRACE")
        .with_param("timeout", 0i64);

    assert_eq!(
        strategy().validate(&node).errors,
        vec![
            "URL is required",
            "Unsupported method: TRACE",
            "Timeout must be greater than zero"
        ]
    );
}

#[tokio::test]
async fn test_url_supplied_through_edge_passes_pre_validation() {
    let (addr, server) = serve_once("HTTP/1.1 200 OK", r#"{"ok":true}"#).await;

    let mut flow = ActionFlow::new("wired-url", "URL from upstream");
    flow.add_node(
        ActionNode::new("target", "setVariable")
            .with_param("variableName", "endpoint")
            .with_param("value", format!("http://{}/from-edge", addr)),
    );
    flow.add_node(ActionNode::new("fetch", "httpRequest"));
    flow.connect("target", "value", "fetch", "url");

    let mut registry = default_registry();
    registry.register(Arc::new(strategy()));
    let executor = FlowExecutor::new(Arc::new(registry));
    let mut ctx = ExecutionContext::new("wired-url");

    let results = executor.execute_flow(&flow, &mut ctx).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[1].success, "{:?}", results[1].error);
    assert_eq!(results[1].outputs.get("status"), Some(&Value::Number(200.0)));
    assert!(server.await.unwrap().starts_with("GET /from-edge"));
}
