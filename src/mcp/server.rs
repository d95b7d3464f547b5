//! MCP server over newline-delimited JSON-RPC
//!
//! Requests are read one line at a time. `tools/call` requests run on their
//! own tasks so a slow exchange call never blocks the next request; every
//! response goes through a single writer task and is matched to its
//! request by `id`.

use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::protocol::{
    code, CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ToolsCallResult,
};
use super::registry::ToolRegistry;
use crate::indodax::IndodaxClient;

pub struct McpServer {
    client: IndodaxClient,
    registry: ToolRegistry,
}

impl McpServer {
    /// Server exposing every Indodax tool
    pub fn new(client: IndodaxClient) -> Self {
        Self::with_registry(client, ToolRegistry::indodax())
    }

    pub fn with_registry(client: IndodaxClient, registry: ToolRegistry) -> Self {
        Self { client, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve on the process stdin/stdout until stdin closes
    pub async fn run_stdio(self) -> Result<()> {
        Arc::new(self)
            .run(tokio::io::stdin(), tokio::io::stdout())
            .await
    }

    /// Serve on an arbitrary reader/writer pair until the reader hits EOF
    ///
    /// Returns after every in-flight tool call has written its response.
    pub async fn run<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = serde_json::to_string(&response)?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            anyhow::Ok(())
        });

        info!(tools = self.registry.len(), "MCP server ready");

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request = match parse_request(line) {
                Ok(request) => request,
                Err(response) => {
                    let _ = tx.send(response);
                    continue;
                }
            };

            if request.method == "tools/call" && !request.is_notification() {
                let server = Arc::clone(&self);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response);
                    }
                });
            } else if let Some(response) = self.handle_request(request).await {
                let _ = tx.send(response);
            }
        }

        debug!("input closed, waiting for in-flight calls");
        drop(tx);
        writer_task.await??;
        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one parsed message; notifications produce no response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => serde_json::to_value(InitializeResult::default())
                .map_err(|e| JsonRpcError::new(code::INTERNAL_ERROR, e.to_string())),
            "ping" => Ok(json!({})),
            "tools/list" => serde_json::to_value(self.registry.descriptors())
                .map(|tools| json!({ "tools": tools }))
                .map_err(|e| JsonRpcError::new(code::INTERNAL_ERROR, e.to_string())),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::new(
                code::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::new(code::INVALID_PARAMS, e.to_string()))?;

        let tool = self.registry.find(&params.name).ok_or_else(|| {
            JsonRpcError::new(code::INVALID_PARAMS, format!("Unknown tool: {}", params.name))
        })?;

        let started = Instant::now();
        let result = match tool.invoke(&self.client, params.arguments).await {
            Ok(value) => {
                info!(
                    tool = tool.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool call succeeded"
                );
                ToolsCallResult::json(&value)
            }
            Err(e) => {
                warn!(
                    tool = tool.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool call failed: {}",
                    e
                );
                ToolsCallResult::error(e.to_string())
            }
        };

        serde_json::to_value(result)
            .map_err(|e| JsonRpcError::new(code::INTERNAL_ERROR, e.to_string()))
    }
}

/// Parse one input line, or build the error response for it
fn parse_request(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::new(code::PARSE_ERROR, format!("Parse error: {}", e)),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::failure(
            id,
            JsonRpcError::new(code::INVALID_REQUEST, format!("Invalid request: {}", e)),
        )
    })
}
