//! MCP Server implementation
//!
//! Decodes JSON-RPC envelopes, dispatches them to the tool registry and
//! serves the line-delimited stdio transport. The SSE transport in
//! `mcp::sse` reuses the same dispatch.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::metrics::ToolMetrics;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::*;

/// MCP Server info
pub const SERVER_NAME: &str = "mailchimp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a failing tool is reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorStyle {
    /// JSON-RPC error envelope with code -32603
    Envelope,
    /// Successful envelope whose `CallToolResult` has `isError: true`
    Content,
}

/// MCP Server for Mailchimp
pub struct McpServer<R> {
    /// Tool registry
    registry: R,

    /// Per-tool call metrics
    metrics: Arc<ToolMetrics>,

    /// Reporting of tool failures
    tool_errors: ToolErrorStyle,
}

impl<R: ToolRegistry> McpServer<R> {
    /// Create a new MCP server
    pub fn new(registry: R, metrics: Arc<ToolMetrics>, tool_errors: ToolErrorStyle) -> Self {
        Self {
            registry,
            metrics,
            tool_errors,
        }
    }

    pub fn metrics(&self) -> &Arc<ToolMetrics> {
        &self.metrics
    }

    /// Run the server on stdio
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        info!("MCP server listening on stdio");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve_lines(reader, writer).await
    }

    /// Serve line-delimited JSON-RPC until the reader hits EOF.
    ///
    /// Each line is dispatched on its own task, so a slow tool call does
    /// not hold up later requests. Responses are written in completion
    /// order. Lines that are not UTF-8 get a parse error and the loop
    /// keeps going; only EOF or a failing reader or writer stops it.
    pub async fn serve_lines<I, O>(self: Arc<Self>, mut reader: I, mut writer: O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let mut tx = Some(tx);
        let mut buf = Vec::new();

        loop {
            tokio::select! {
                read = reader.read_until(b'\n', &mut buf), if tx.is_some() => {
                    if read? == 0 {
                        debug!("stdin closed, waiting for in-flight requests");
                        tx = None;
                        continue;
                    }
                    let line = std::mem::take(&mut buf);
                    if let Some(tx) = &tx {
                        self.dispatch_line(line, tx);
                    }
                }
                Some(response) = rx.recv() => {
                    let mut frame = serde_json::to_string(&response)?;
                    frame.push('\n');
                    writer.write_all(frame.as_bytes()).await?;
                    writer.flush().await?;
                }
                else => break,
            }
        }

        debug!("stdio transport stopped");
        Ok(())
    }

    fn dispatch_line(self: &Arc<Self>, line: Vec<u8>, tx: &mpsc::UnboundedSender<JsonRpcResponse>) {
        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                let _ = tx.send(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
                return;
            }
        };
        if line.trim().is_empty() {
            return;
        }

        let server = Arc::clone(self);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = server.handle_message(&line).await {
                if tx.send(response).is_err() {
                    debug!("stdio writer gone, dropping response");
                }
            }
        });
    }

    /// Handle a raw JSON-RPC message; `None` for notifications
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(message) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => Some(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(format!("Parse error: {}", e)),
            )),
        }
    }

    /// Handle an already-decoded JSON-RPC message
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").and_then(RequestId::from_value);

        if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Invalid Request: jsonrpc must be \"2.0\""),
            ));
        }

        let is_notification = value.get("id").is_none();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid Request: {}", e)),
                ));
            }
        };

        debug!(method = %request.method, id = ?request.id, "Dispatching request");

        match request.method.as_str() {
            methods::INITIALIZE => Some(respond(request.id, &self.initialize_result())),
            methods::INITIALIZED => None,
            methods::PING => Some(JsonRpcResponse::success(request.id, json!({}))),
            methods::LIST_TOOLS => Some(respond(
                request.id,
                &ListToolsResult {
                    tools: self.registry.list_tools(),
                },
            )),
            methods::CALL_TOOL => Some(self.handle_call_tool(request.id, request.params).await),
            method if is_notification && method.starts_with("notifications/") => None,
            method => Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(method),
            )),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
        }
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tool parameters"),
                );
            }
        };

        if !self.registry.has_tool(&params.name) {
            return JsonRpcResponse::error(id, JsonRpcError::unknown_tool(&params.name));
        }

        let started = Instant::now();
        let outcome = self.registry.invoke(&params.name, params.arguments).await;
        self.metrics
            .record(&params.name, started.elapsed(), outcome.is_err());

        match outcome {
            Ok(value) => respond(id, &CallToolResult::json(&value)),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                match self.tool_errors {
                    ToolErrorStyle::Envelope => {
                        JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string()))
                    }
                    ToolErrorStyle::Content => {
                        respond(id, &CallToolResult::error(e.to_string()))
                    }
                }
            }
        }
    }
}

/// Wrap a serializable result in a success envelope
fn respond<T: Serialize>(id: Option<RequestId>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ApiError, MailchimpMcpError};
    use crate::mcp::types::Tool;

    /// Registry with one working tool and one that always fails
    pub(crate) struct FakeRegistry;

    impl ToolRegistry for FakeRegistry {
        fn list_tools(&self) -> Vec<Tool> {
            ["mc_ping", "mc_fail", "mc_slow"]
                .into_iter()
                .map(|name| Tool {
                    name: name.to_string(),
                    description: None,
                    input_schema: json!({"type": "object", "properties": {}}),
                })
                .collect()
        }

        async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
            match name {
                "mc_ping" => Ok(json!({"health_status": "ok", "echo": args})),
                "mc_slow" => {
                    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
                    Ok(json!({"slow": true}))
                }
                _ => Err(MailchimpMcpError::Api(ApiError::ServerError {
                    status: 503,
                    body: "upstream down".to_string(),
                })),
            }
        }
    }

    fn server(style: ToolErrorStyle) -> McpServer<FakeRegistry> {
        McpServer::new(FakeRegistry, Arc::new(ToolMetrics::new()), style)
    }

    async fn call(server: &McpServer<FakeRegistry>, message: Value) -> Value {
        let response = server.handle_value(message).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "mailchimp");
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;

        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], MCP_VERSION);
        assert_eq!(resp["result"]["serverInfo"]["name"], "mailchimp");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_list_tools_echoes_string_id() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": "req-7", "method": "tools/list"})).await;

        assert_eq!(resp["id"], "req-7");
        assert_eq!(resp["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_numeric_ids_echo_exactly() {
        let server = server(ToolErrorStyle::Envelope);
        let big = server
            .handle_message(r#"{"jsonrpc":"2.0","id":9223372036854775808,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(big).unwrap()["id"], json!(9223372036854775808u64));

        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 2.5, "method": "ping"})).await;
        assert_eq!(resp["id"], 2.5);
        assert_eq!(resp["result"], json!({}));
    }

    #[tokio::test]
    async fn test_wrong_version_is_invalid_request() {
        let server = server(ToolErrorStyle::Envelope);
        for version in [json!("1.0"), json!(2.0), Value::Null] {
            let resp = call(&server, json!({"jsonrpc": version, "id": 4, "method": "tools/list"})).await;
            assert_eq!(resp["error"]["code"], -32600);
            assert_eq!(resp["id"], 4);
        }

        let resp = call(&server, json!({"id": 5, "method": "tools/list"})).await;
        assert_eq!(resp["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_non_object_is_invalid_request() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!([1, 2, 3])).await;
        assert_eq!(resp["error"]["code"], -32600);
        assert!(resp["id"].is_null());
    }

    #[tokio::test]
    async fn test_missing_method_is_invalid_request() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 9})).await;
        assert_eq!(resp["error"]["code"], -32600);
        assert_eq!(resp["id"], 9);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = server.handle_message("{not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, -32700);
        assert_eq!(resp.id, None);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"})).await;
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["id"], 2);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server(ToolErrorStyle::Envelope);
        let initialized = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(server.handle_value(initialized).await.is_none());

        let cancelled = json!({"jsonrpc": "2.0", "method": "notifications/cancelled"});
        assert!(server.handle_value(cancelled).await.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "ping"})).await;
        assert_eq!(resp["result"], json!({}));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = server(ToolErrorStyle::Content);
        let resp = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 11,
                "method": "tools/call",
                "params": {"name": "mc_unknownTool", "arguments": {}}
            }),
        )
        .await;

        assert_eq!(resp["id"], 11);
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["error"]["message"], "Unknown tool: mc_unknownTool");
    }

    #[tokio::test]
    async fn test_call_tool_success_wraps_json() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 12,
                "method": "tools/call",
                "params": {"name": "mc_ping", "arguments": {"x": 1}}
            }),
        )
        .await;

        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let inner: Value = serde_json::from_str(text).unwrap();
        assert_eq!(inner["echo"]["x"], 1);
        assert!(resp["result"].get("isError").is_none());
        assert_eq!(server.metrics().snapshot()["mc_ping"].calls, 1);
    }

    #[tokio::test]
    async fn test_tool_error_as_envelope() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 13, "method": "tools/call", "params": {"name": "mc_fail"}}),
        )
        .await;

        assert_eq!(resp["error"]["code"], -32603);
        assert!(resp["error"]["message"].as_str().unwrap().contains("upstream down"));
        assert_eq!(server.metrics().snapshot()["mc_fail"].errors, 1);
    }

    #[tokio::test]
    async fn test_tool_error_as_content() {
        let server = server(ToolErrorStyle::Content);
        let resp = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 14, "method": "tools/call", "params": {"name": "mc_fail"}}),
        )
        .await;

        assert!(resp.get("error").is_none());
        assert_eq!(resp["result"]["isError"], true);
        assert!(resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("503"));
    }

    #[tokio::test]
    async fn test_call_tool_without_params() {
        let server = server(ToolErrorStyle::Envelope);
        let resp = call(&server, json!({"jsonrpc": "2.0", "id": 15, "method": "tools/call"})).await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    async fn serve(server: McpServer<FakeRegistry>, input: &[u8]) -> Vec<Value> {
        let mut output = Vec::new();
        Arc::new(server)
            .serve_lines(input, &mut output)
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn by_id(lines: &[Value], id: i64) -> &Value {
        lines.iter().find(|l| l["id"] == id).unwrap()
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "garbage\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}",
        );
        let lines = serve(server(ToolErrorStyle::Content), input.as_bytes()).await;

        assert_eq!(lines.len(), 3);
        assert_eq!(by_id(&lines, 1)["result"]["serverInfo"]["name"], "mailchimp");
        assert!(by_id(&lines, 2)["result"]["tools"].is_array());
        let parse_errors: Vec<&Value> = lines.iter().filter(|l| l["id"].is_null()).collect();
        assert_eq!(parse_errors.len(), 1);
        assert_eq!(parse_errors[0]["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_the_loop() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

        let lines = serve(server(ToolErrorStyle::Content), &input).await;

        assert_eq!(lines.len(), 3);
        assert_eq!(by_id(&lines, 1)["result"], json!({}));
        assert_eq!(by_id(&lines, 2)["result"], json!({}));
        let bad = lines.iter().find(|l| l["id"].is_null()).unwrap();
        assert_eq!(bad["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_slow_tool_does_not_block_later_requests() {
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/call\",\"params\":{\"name\":\"mc_slow\"}}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );
        let lines = serve(server(ToolErrorStyle::Content), input.as_bytes()).await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 2);
        assert_eq!(lines[1]["id"], 1);
        assert!(lines[1]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("slow"));
    }
}
