//! MCP `initialize` handler.

use serde_json::json;

use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// MCP protocol version we advertise.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "ChillMCP";

/// Handles an `initialize` request.
///
/// The server only offers tools, so the capability set is fixed.
#[must_use]
pub fn handle(request: &JsonRpcRequest) -> JsonRpcResponse {
    if let Some(client) = request
        .params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(serde_json::Value::as_str)
    {
        tracing::info!(client, "client initialized");
    }

    JsonRpcResponse::success(
        request.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}
