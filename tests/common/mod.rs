//! Shared integration-test harness for spawning a `chillmcp` server as a
//! child process and communicating over stdio JSON-RPC.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Default timeout for reading a single message from the server.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Path to the compiled binary under test.
pub const BIN: &str = env!("CARGO_BIN_EXE_chillmcp");

/// Server settings for one spawned process.
#[derive(Debug, Clone, Copy)]
pub struct ServeSettings {
    pub boss_alertness: i64,
    pub boss_alertness_cooldown: i64,
    pub break_delay_secs: u64,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            boss_alertness: 50,
            boss_alertness_cooldown: 300,
            break_delay_secs: 0,
        }
    }
}

/// A running `chillmcp` server process with helpers for JSON-RPC I/O.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
#[allow(clippy::missing_panics_doc)]
pub struct ChillProcess {
    child: Child,
    stdin: tokio::process::ChildStdin,
    reader: BufReader<tokio::process::ChildStdout>,
    next_id: i64,
}

impl ChillProcess {
    /// Spawns a server with the given settings.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(settings: ServeSettings) -> Self {
        let mut child = Command::new(BIN)
            .args([
                "serve",
                "--boss_alertness",
                &settings.boss_alertness.to_string(),
                "--boss_alertness_cooldown",
                &settings.boss_alertness_cooldown.to_string(),
                "--break-delay-secs",
                &settings.break_delay_secs.to_string(),
                "--quiet",
            ])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn chillmcp");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
            next_id: 1,
        }
    }

    /// Writes raw bytes to the server's stdin.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stdin
            .write_all(bytes)
            .await
            .expect("failed to write to stdin");
        self.stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads one NDJSON message from the server's stdout.
    ///
    /// Panics on EOF, I/O error, or if no message arrives within `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_message(&mut self, timeout: Duration) -> Value {
        let mut line = String::new();
        let result = tokio::time::timeout(timeout, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                assert!(n > 0, "unexpected EOF from server");
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return serde_json::from_str::<Value>(trimmed)
                        .unwrap_or_else(|e| panic!("invalid JSON from server: {e}\nline: {line}"));
                }
            }
        })
        .await;
        result.expect("timed out waiting for message from server")
    }

    /// Sends a JSON-RPC request without waiting; returns its id.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_only(&mut self, method: &str, params: Option<Value>) -> i64 {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let mut buf = serde_json::to_string(&request).expect("failed to serialize request");
        buf.push('\n');
        self.send_raw(buf.as_bytes()).await;
        id
    }

    /// Sends a JSON-RPC request and returns the matching response.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_request(&mut self, method: &str, params: Option<Value>) -> Value {
        self.send_request_timeout(method, params, DEFAULT_TIMEOUT)
            .await
    }

    /// Like [`send_request`](Self::send_request) but with a custom timeout.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_request_timeout(
        &mut self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Value {
        let id = self.send_only(method, params).await;
        loop {
            let msg = self.read_message(timeout).await;
            if msg.get("id").and_then(Value::as_i64) == Some(id) {
                return msg;
            }
        }
    }

    /// Sends the MCP `initialize` handshake and returns the response.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_initialize(&mut self) -> Value {
        let resp = self
            .send_request(
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "integration-test", "version": "0.0.1" }
                })),
            )
            .await;
        self.send_raw(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
            .await;
        resp
    }

    /// Calls a tool and returns the text of its first content item.
    #[allow(clippy::missing_panics_doc)]
    pub async fn call_tool_text(&mut self, name: &str) -> String {
        let resp = self
            .send_request("tools/call", Some(json!({ "name": name })))
            .await;
        resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("no text content in {resp}"))
            .to_string()
    }

    /// Closes stdin and returns the exit code once the server stops.
    #[allow(clippy::missing_panics_doc)]
    pub async fn shutdown(self) -> Option<i32> {
        let Self {
            mut child, stdin, ..
        } = self;

        drop(stdin);

        match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
            Ok(status) => status.expect("failed to wait for child").code(),
            Err(_) => {
                child.kill().await.expect("failed to kill child");
                None
            }
        }
    }
}

/// Parses the trailing `Stress Level` / `Boss Alert Level` lines of a break
/// response.
#[allow(clippy::missing_panics_doc)]
pub fn levels_of(text: &str) -> (u8, u8) {
    let field = |prefix: &str| -> u8 {
        text.lines()
            .find_map(|l| l.strip_prefix(prefix))
            .unwrap_or_else(|| panic!("missing {prefix:?} in {text:?}"))
            .trim()
            .parse()
            .expect("level is a number")
    };
    (field("Stress Level: "), field("Boss Alert Level: "))
}
