//! MCP stdio server implementing JSON-RPC 2.0 over stdin/stdout.
//!
//! Exposes the operation catalog as MCP tools. Each `tools/call` is
//! dispatched through the registry and the rendered envelope is returned
//! as the text content of the result.
//!
//! Protocol: newline-delimited JSON-RPC 2.0 on stdin/stdout.
//! Logging goes to stderr (stdout is reserved for protocol messages).
//!
//! `tools/call` requests run as their own tasks so a long scan does not hold
//! up other requests; responses share one writer and may arrive out of
//! request order.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::services::OperationRegistry;

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

const RESPONSE_BUFFER: usize = 64;

/// What a single inbound message turned into.
enum Routed {
    /// Already answered, or a notification with nothing to answer.
    Done(Option<String>),
    /// A tool invocation still to be run.
    ToolCall { id: Value, params: Value },
}

/// MCP stdio server that exposes the security tool catalog.
#[derive(Clone)]
pub struct StdioServer {
    registry: Arc<OperationRegistry>,
}

impl StdioServer {
    pub const fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    /// Run the server loop on the process stdin/stdout until stdin closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Run the server loop over arbitrary streams.
    ///
    /// Returns once the reader is exhausted and every in-flight call has
    /// been answered.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::channel::<String>(RESPONSE_BUFFER);

        tracing::info!(operations = self.registry.len(), "stdio server started");

        let read_loop = async move {
            let mut lines = reader.lines();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match self.route(line) {
                    Routed::Done(Some(response)) => {
                        if tx.send(response).await.is_err() {
                            break;
                        }
                    }
                    Routed::Done(None) => {}
                    Routed::ToolCall { id, params } => {
                        let server = self.clone();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let response = server.handle_tools_call(id, &params).await;
                            let _ = tx.send(response).await;
                        });
                    }
                }
            }
            Ok::<_, anyhow::Error>(())
        };

        let write_loop = async {
            while let Some(response) = rx.recv().await {
                let mut response_bytes = response.into_bytes();
                response_bytes.push(b'\n');
                writer.write_all(&response_bytes).await?;
                writer.flush().await?;
            }
            Ok::<_, anyhow::Error>(())
        };

        tokio::try_join!(read_loop, write_loop)?;

        tracing::info!("stdio server stopped");
        Ok(())
    }

    /// Handle one protocol message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        match self.route(line) {
            Routed::Done(response) => response,
            Routed::ToolCall { id, params } => Some(self.handle_tools_call(id, &params).await),
        }
    }

    fn route(&self, line: &str) -> Routed {
        let request: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Routed::Done(Some(self.error_response(
                    Value::Null,
                    PARSE_ERROR,
                    &format!("Parse error: {e}"),
                )));
            }
        };

        let Some(request) = request.as_object() else {
            return Routed::Done(Some(self.error_response(
                Value::Null,
                INVALID_REQUEST,
                "Invalid request",
            )));
        };

        let id = request.get("id").cloned();
        let method = request.get("method").and_then(Value::as_str).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

        // notifications carry no id and never get a response
        let Some(id) = id else {
            tracing::debug!(method, "Ignoring notification");
            return Routed::Done(None);
        };

        tracing::debug!(method, "Handling request");
        let response = match method {
            "initialize" => self.handle_initialize(id),
            "ping" => self.success_response(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => return Routed::ToolCall { id, params },
            _ => self.error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {method}")),
        };
        Routed::Done(Some(response))
    }

    fn handle_initialize(&self, id: Value) -> String {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        self.success_response(id, result)
    }

    fn handle_tools_list(&self, id: Value) -> String {
        let tools: Vec<Value> = self
            .registry
            .descriptors()
            .map(|descriptor| {
                json!({
                    "name": descriptor.name,
                    "description": descriptor.description,
                    "inputSchema": descriptor.input_schema(),
                })
            })
            .collect();
        self.success_response(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Value, params: &Value) -> String {
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return self.error_response(id, INVALID_PARAMS, "Missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let (success, text) = self.registry.dispatch_text(tool_name, arguments).await;
        let mut result = json!({
            "content": [{
                "type": "text",
                "text": text
            }]
        });
        if !success {
            result["isError"] = Value::Bool(true);
        }
        self.success_response(id, result)
    }

    fn success_response(&self, id: Value, result: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        })
        .to_string()
    }

    fn error_response(&self, id: Value, code: i32, message: &str) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": code,
                "message": message
            }
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Envelope, OperationDescriptor, ParamKind, ParamSpec, Payload};
    use crate::domain::ports::Operation;
    use crate::services::envelope;
    use async_trait::async_trait;
    use serde_json::Map;

    struct Fixed {
        descriptor: OperationDescriptor,
    }

    #[async_trait]
    impl Operation for Fixed {
        fn descriptor(&self) -> &OperationDescriptor {
            &self.descriptor
        }

        async fn invoke(&self, arguments: Value) -> Envelope {
            envelope::success(
                arguments.as_object().cloned().unwrap_or_default(),
                Payload::records("subdomains", vec![json!({ "host": "a.example.com" })]),
            )
        }
    }

    struct Slow {
        descriptor: OperationDescriptor,
    }

    #[async_trait]
    impl Operation for Slow {
        fn descriptor(&self) -> &OperationDescriptor {
            &self.descriptor
        }

        async fn invoke(&self, _arguments: Value) -> Envelope {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            envelope::success(Map::new(), Payload::raw_output("done"))
        }
    }

    fn server() -> StdioServer {
        let operation: Arc<dyn Operation> = Arc::new(Fixed {
            descriptor: OperationDescriptor::new("subdomain_enum", "subfinder", "Enumerate")
                .param(ParamSpec::required("domain", ParamKind::String, "Domain")),
        });
        StdioServer::new(Arc::new(
            OperationRegistry::from_operations([operation]).unwrap(),
        ))
    }

    async fn call(server: &StdioServer, request: Value) -> Value {
        let response = server.handle_message(&request.to_string()).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = call(&server(), json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" })).await;
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "secops-mcp");
    }

    #[tokio::test]
    async fn test_tools_list_has_schema() {
        let response = call(&server(), json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" })).await;
        let tool = &response["result"]["tools"][0];
        assert_eq!(tool["name"], "subdomain_enum");
        assert_eq!(tool["inputSchema"]["required"], json!(["domain"]));
    }

    #[tokio::test]
    async fn test_tools_call_returns_envelope_text() {
        let response = call(
            &server(),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "subdomain_enum", "arguments": { "domain": "example.com" } }
            }),
        )
        .await;
        assert!(response["result"].get("isError").is_none());
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let envelope: Value = serde_json::from_str(text).unwrap();
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["domain"], "example.com");
        assert_eq!(envelope["count"], 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result_not_rpc_error() {
        let response = call(
            &server(),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": { "name": "nope", "arguments": {} }
            }),
        )
        .await;
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("unknown_operation"));
    }

    #[tokio::test]
    async fn test_parse_error_and_unknown_method() {
        let server = server();
        let response: Value =
            serde_json::from_str(&server.handle_message("{not json").await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);

        let response = call(&server, json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/list" })).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notifications_are_silent() {
        let message = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
        assert!(server().handle_message(&message).await.is_none());
    }

    #[tokio::test]
    async fn test_serve_over_streams() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
        );
        let mut output = Vec::new();
        server().serve(input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_other_requests() {
        let slow: Arc<dyn Operation> = Arc::new(Slow {
            descriptor: OperationDescriptor::new("network_scan", "nmap", "Scan"),
        });
        let server = StdioServer::new(Arc::new(OperationRegistry::from_operations([slow]).unwrap()));

        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/call\",\"params\":{\"name\":\"network_scan\"}}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 2);
        assert_eq!(responses[1]["id"], 1);
        assert!(responses[1]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("done"));
    }
}
