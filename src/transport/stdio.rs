//! NDJSON transport.
//!
//! One JSON-RPC message per line. Production wires it to stdin/stdout; tests
//! wire it to an in-memory duplex pipe.

use super::{
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_STDIO_BUFFER_SIZE, JsonRpcMessage, Result, Transport,
};

use std::str::FromStr;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Stdin, Stdout,
};
use tokio::sync::Mutex;

/// Environment variable overriding the maximum message size.
pub const MAX_MESSAGE_SIZE_ENV: &str = "CHILLMCP_MAX_MESSAGE_SIZE";

/// Environment variable overriding the stdio buffer size.
pub const STDIO_BUFFER_SIZE_ENV: &str = "CHILLMCP_STDIO_BUFFER_SIZE";

/// Configuration for the stdio transport.
#[derive(Debug, Clone, Copy)]
pub struct StdioConfig {
    /// Maximum message size in bytes.
    pub max_message_size: usize,
    /// Read/write buffer size in bytes.
    pub buffer_size: usize,
}

impl StdioConfig {
    /// Loads configuration from environment variables with defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CHILLMCP_MAX_MESSAGE_SIZE` | 10 MiB |
    /// | `CHILLMCP_STDIO_BUFFER_SIZE` | 64 KiB |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_message_size: env_or(MAX_MESSAGE_SIZE_ENV, DEFAULT_MAX_MESSAGE_SIZE),
            buffer_size: env_or(STDIO_BUFFER_SIZE_ENV, DEFAULT_STDIO_BUFFER_SIZE),
        }
    }
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            buffer_size: DEFAULT_STDIO_BUFFER_SIZE,
        }
    }
}

/// NDJSON transport over a reader/writer pair.
///
/// Reader and writer sit behind separate `tokio::sync::Mutex` locks so
/// reading the next request never waits on a response being written.
///
/// Input handling:
/// - a last line without `\n` is still parsed before EOF;
/// - empty lines are skipped;
/// - lines over the size limit are drained without buffering and skipped;
/// - invalid UTF-8 and unparseable JSON are logged and skipped.
pub struct StdioTransport<R = Stdin, W = Stdout> {
    reader: Mutex<BufReader<R>>,
    writer: Mutex<BufWriter<W>>,
    config: StdioConfig,
}

impl StdioTransport {
    /// Creates a stdin/stdout transport configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StdioConfig::from_env())
    }

    /// Creates a stdin/stdout transport with explicit configuration.
    #[must_use]
    pub fn with_config(config: StdioConfig) -> Self {
        Self::with_io(tokio::io::stdin(), tokio::io::stdout(), config)
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a transport over an arbitrary reader and writer.
    #[must_use]
    pub fn with_io(reader: R, writer: W, config: StdioConfig) -> Self {
        Self {
            reader: Mutex::new(BufReader::with_capacity(config.buffer_size, reader)),
            writer: Mutex::new(BufWriter::with_capacity(config.buffer_size, writer)),
            config,
        }
    }
}

impl<R, W> std::fmt::Debug for StdioTransport<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send_message(&self, message: &JsonRpcMessage) -> Result<()> {
        let serialized = serde_json::to_string(message)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(serialized.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        drop(writer);
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)] // reader must be held across the loop
    async fn receive_message(&self) -> Result<Option<JsonRpcMessage>> {
        let mut reader = self.reader.lock().await;
        // Copy at most max_message_size + 1 bytes of a line; anything past
        // that is consumed from the BufReader and discarded.
        let read_limit = self.config.max_message_size + 1;
        let mut buf: Vec<u8> = Vec::with_capacity(read_limit.min(64 * 1024));

        loop {
            buf.clear();
            let mut overflowed = false;

            loop {
                let available = reader.fill_buf().await?;
                if available.is_empty() {
                    if buf.is_empty() && !overflowed {
                        return Ok(None);
                    }
                    break;
                }

                if let Some(pos) = available.iter().position(|&b| b == b'\n') {
                    if !overflowed {
                        let remaining_cap = read_limit.saturating_sub(buf.len());
                        let copy_len = pos.min(remaining_cap);
                        buf.extend_from_slice(&available[..copy_len]);
                        if pos > remaining_cap {
                            overflowed = true;
                        }
                    }
                    reader.consume(pos + 1);
                    break;
                }

                if !overflowed {
                    let remaining_cap = read_limit.saturating_sub(buf.len());
                    if remaining_cap == 0 {
                        overflowed = true;
                    } else {
                        let copy_len = available.len().min(remaining_cap);
                        buf.extend_from_slice(&available[..copy_len]);
                        if available.len() > remaining_cap {
                            overflowed = true;
                        }
                    }
                }
                let consumed = available.len();
                reader.consume(consumed);
            }

            if overflowed || buf.len() > self.config.max_message_size {
                tracing::warn!(
                    limit = self.config.max_message_size,
                    "message exceeds size limit, skipping"
                );
                continue;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("invalid UTF-8 in message, skipping line: {e}");
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonRpcMessage>(trimmed) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        line = %sanitize_for_log(trimmed, 200),
                        "invalid JSON-RPC message, skipping"
                    );
                }
            }
        }
    }
}

/// Truncates and strips control characters from untrusted input before logging.
fn sanitize_for_log(input: &str, max_len: usize) -> String {
    input
        .chars()
        .take(max_len)
        .map(|c| {
            if c.is_control() && c != '\t' {
                '\u{FFFD}'
            } else {
                c
            }
        })
        .collect()
}

/// Reads an environment variable, parsing it to type `T`, or returns the default.
///
/// Logs a warning if the variable is set but cannot be parsed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %v, "invalid env var value, using default");
            default
        }),
        Err(_) => default,
    }
}
