//! MCP host transport - JSON-RPC messages and the stdio server

pub mod messages;
pub mod server;

pub use messages::{
    CallToolParams, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION,
};
pub use server::{McpServer, McpServerConfig, handle_request};
