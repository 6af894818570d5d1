//! MCP Server - newline-delimited JSON-RPC over a byte stream
//!
//! Provides:
//! - Request parsing and method routing
//! - One task per request, so slow upstream calls do not block others
//! - A single writer task that serializes responses onto the output stream

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{MapsError, Result};
use crate::mcp::messages::{
    CallToolParams, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult,
};
use crate::tools::ToolDispatcher;

/// Configuration for the MCP server
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Capacity of the response channel feeding the writer
    pub response_channel_capacity: usize,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            response_channel_capacity: 64,
        }
    }
}

/// MCP server bound to a tool dispatcher
pub struct McpServer {
    config: McpServerConfig,
    dispatcher: Arc<dyn ToolDispatcher>,
}

impl McpServer {
    /// Create a new server with default config
    pub fn new(dispatcher: Arc<dyn ToolDispatcher>) -> Self {
        Self::with_config(dispatcher, McpServerConfig::default())
    }

    /// Create a new server with custom config
    pub fn with_config(dispatcher: Arc<dyn ToolDispatcher>, config: McpServerConfig) -> Self {
        Self { config, dispatcher }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn run_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`
    ///
    /// Returns once the reader hits EOF and every in-flight request has been
    /// answered.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (response_tx, response_rx) =
            mpsc::channel::<JsonRpcResponse>(self.config.response_channel_capacity);
        let writer_task = tokio::spawn(write_responses(writer, response_rx));

        info!("MCP server ready");
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request = match parse_message(line) {
                Ok(request) => request,
                Err(response) => {
                    if response_tx.send(response).await.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let response_tx = response_tx.clone();
            tokio::spawn(async move {
                if let Some(response) = respond(dispatcher, request).await {
                    if response_tx.send(response).await.is_err() {
                        warn!("Response dropped: writer closed");
                    }
                }
            });
        }

        info!("Input closed, draining in-flight requests");
        drop(response_tx);

        writer_task
            .await
            .map_err(|e| MapsError::Protocol(format!("Writer task failed: {}", e)))?
    }
}

/// Decode one line; an undecodable line yields the error response to send back
fn parse_message(line: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!("Unparseable message: {}", e);
        JsonRpcResponse::error(
            Value::Null,
            JsonRpcError::new(ErrorCode::ParseError, format!("Parse error: {}", e)),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        warn!("Invalid request: {}", e);
        JsonRpcResponse::error(
            id,
            JsonRpcError::new(ErrorCode::InvalidRequest, format!("Invalid request: {}", e)),
        )
    })
}

/// Run a request in its own task so a panicking handler still gets an answer
async fn respond(dispatcher: Arc<dyn ToolDispatcher>, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone();
    let method = request.method.clone();

    let handler = tokio::spawn(async move { handle_request(dispatcher.as_ref(), request).await });
    match handler.await {
        Ok(response) => response,
        Err(e) => {
            error!("Handler for {} failed: {}", method, e);
            id.map(|id| {
                JsonRpcResponse::error(
                    id,
                    JsonRpcError::new(ErrorCode::InternalError, format!("Internal error handling {}", method)),
                )
            })
        }
    }
}

/// Route a single request; `None` for notifications
pub async fn handle_request(
    dispatcher: &dyn ToolDispatcher,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    debug!("<- {}", request.method);

    let Some(id) = request.id else {
        debug!("Notification: {}", request.method);
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => to_response(id, &InitializeResult::default()),
        "ping" => JsonRpcResponse::success(id, Value::Object(Default::default())),
        "tools/list" => to_response(
            id,
            &ListToolsResult {
                tools: dispatcher.definitions(),
            },
        ),
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<CallToolParams>(params) {
                Ok(params) => {
                    info!("Calling tool {}", params.name);
                    let envelope = dispatcher.dispatch(&params.name, params.arguments).await;
                    to_response(id, &envelope)
                }
                Err(e) => JsonRpcResponse::error(
                    id,
                    JsonRpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {}", e)),
                ),
            }
        }
        other => JsonRpcResponse::error(
            id,
            JsonRpcError::new(ErrorCode::MethodNotFound, format!("Method not found: {}", other)),
        ),
    };

    Some(response)
}

fn to_response<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::new(ErrorCode::InternalError, e.to_string())),
    }
}

async fn write_responses<W>(mut writer: W, mut responses: mpsc::Receiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
