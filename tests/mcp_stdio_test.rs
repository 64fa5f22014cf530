//! MCP stdio session against the full catalog.

mod common;

use common::{stub_registry, Reply, StubRunner};
use serde_json::{json, Value};
use std::sync::Arc;

use secops_mcp::adapters::mcp::StdioServer;

#[tokio::test]
async fn test_session_lists_and_calls_tools() {
    let runner = StubRunner::with_replies([Reply::ok("{\"host\":\"example.com\",\"port\":\"443\"}\n")]);
    let server = StdioServer::new(Arc::new(stub_registry(&runner)));

    let input = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "tls_inspect", "arguments": { "host": "example.com" } }
        }),
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": { "name": "tls_inspect", "arguments": {} }
        }),
    ]
    .iter()
    .map(|m| format!("{m}\n"))
    .collect::<String>();

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let mut responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 4);
    // tool calls may finish in any order
    responses.sort_by_key(|r| r["id"].as_i64());

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 18);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));

    let envelope: Value =
        serde_json::from_str(responses[2]["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["host"], "example.com");
    assert_eq!(envelope["port"], 443);
    assert_eq!(envelope["count"], 1);

    assert_eq!(responses[3]["result"]["isError"], true);
    let envelope: Value =
        serde_json::from_str(responses[3]["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["error_kind"], "invalid_input");

    assert_eq!(runner.recorded().len(), 1);
}
