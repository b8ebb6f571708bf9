//! MCP request handler dispatch.
//!
//! Routes incoming JSON-RPC requests to the handler for their method.
//! Every handler reads and writes state through the shared [`StateCore`].

pub mod initialize;
pub mod tools;

use crate::state::StateCore;
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse, error_codes};

/// Dispatches an MCP request to the appropriate handler.
///
/// Unknown methods get a `-32601` error response.
pub async fn handle_request(request: &JsonRpcRequest, core: &StateCore) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => initialize::handle(request),
        "ping" => JsonRpcResponse::success(request.id.clone(), serde_json::json!({})),
        "tools/list" => tools::handle_list(request),
        "tools/call" => tools::handle_call(request, core).await,
        other => {
            tracing::debug!(method = other, "unknown method");
            JsonRpcResponse::error(
                request.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )
        }
    }
}
