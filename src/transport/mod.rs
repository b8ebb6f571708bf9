//! Transport abstraction layer.
//!
//! The [`Transport`] trait sends and receives JSON-RPC messages. The only
//! implementation is [`StdioTransport`], newline-delimited JSON over a
//! reader/writer pair (stdin/stdout in production).

pub mod jsonrpc;
pub mod stdio;

pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, error_codes,
};
pub use stdio::{StdioConfig, StdioTransport};

use crate::error::TransportError;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Default maximum message size in bytes (10 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Default buffer size for the stdio transport (64 KiB).
pub const DEFAULT_STDIO_BUFFER_SIZE: usize = 64 * 1024;

/// Async transport for JSON-RPC messages.
///
/// Methods take `&self`; implementations use interior mutability so a
/// single transport can be shared by the read loop and every request task.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends a complete JSON-RPC message with proper framing.
    ///
    /// Concurrent callers never interleave their output.
    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()>;

    /// Receives the next JSON-RPC message.
    ///
    /// Returns `Ok(None)` on EOF. Malformed input is logged and skipped
    /// rather than returned as an error.
    async fn receive_message(&self) -> Result<Option<JsonRpcMessage>>;
}
