//! Server runtime.
//!
//! The [`Server`] reads JSON-RPC messages from the transport and runs each
//! request on its own task against the shared [`StateCore`], so one
//! caller's mandated delay never holds up anyone else. It also owns the
//! background cooldown task for the lifetime of the run.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::handlers;
use crate::observability::metrics;
use crate::state::{COOLDOWN_TICK, StateCore};
use crate::transport::Transport;
use crate::transport::jsonrpc::{JSONRPC_VERSION, JsonRpcMessage, JsonRpcRequest};

/// Options for constructing a [`Server`].
pub struct ServerOptions {
    /// Shared stress and alert state.
    pub core: Arc<StateCore>,
    /// Transport implementation.
    pub transport: Arc<dyn Transport>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// MCP server runtime.
pub struct Server {
    core: Arc<StateCore>,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
}

impl Server {
    /// Creates a new server from the given options.
    ///
    /// Cancelling `cancel` stops the read loop and aborts requests still in
    /// flight, including any sleeping through a mandated delay.
    #[must_use]
    pub fn new(opts: ServerOptions) -> Self {
        Self {
            core: opts.core,
            transport: opts.transport,
            cancel: opts.cancel,
        }
    }

    /// Runs the server until EOF or cancellation.
    ///
    /// On EOF, requests already in flight are allowed to finish and answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails fatally.
    pub async fn run(&self) -> Result<()> {
        info!(
            boss_alertness = self.core.config().boss_alertness(),
            cooldown_secs = self.core.config().boss_alertness_cooldown(),
            "ChillMCP server started"
        );
        let cooldown = self.core.start_cooldown_task(COOLDOWN_TICK);
        let mut in_flight = JoinSet::new();

        let result = self.main_loop(&mut in_flight).await;

        if self.cancel.is_cancelled() {
            in_flight.abort_all();
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    warn!(error = %e, "request task panicked");
                }
            }
        }
        cooldown.shutdown().await;

        match &result {
            Ok(()) => info!("server stopped"),
            Err(e) => warn!(error = %e, "server stopped with error"),
        }
        result
    }

    async fn main_loop(&self, in_flight: &mut JoinSet<()>) -> Result<()> {
        loop {
            let message = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("server cancelled");
                    break;
                }
                msg = self.transport.receive_message() => msg?,
            };

            let Some(message) = message else {
                debug!("transport EOF, shutting down");
                break;
            };

            let request = match message {
                JsonRpcMessage::Request(req) => req,
                JsonRpcMessage::Response(_) => {
                    debug!("ignoring incoming response");
                    continue;
                }
                JsonRpcMessage::Notification(notif) => {
                    debug!(method = %notif.method, "ignoring incoming notification");
                    continue;
                }
            };

            if request.jsonrpc != JSONRPC_VERSION {
                warn!(
                    version = %request.jsonrpc,
                    expected = JSONRPC_VERSION,
                    "invalid JSON-RPC version"
                );
            }

            // Reap finished tasks so the set does not grow without bound.
            while in_flight.try_join_next().is_some() {}

            in_flight.spawn(serve_request(
                request,
                Arc::clone(&self.core),
                Arc::clone(&self.transport),
            ));
        }

        Ok(())
    }
}

/// Handles one request and writes its response.
async fn serve_request(
    request: JsonRpcRequest,
    core: Arc<StateCore>,
    transport: Arc<dyn Transport>,
) {
    let start = Instant::now();
    metrics::record_request(&request.method);
    debug!(method = %request.method, id = %request.id, "request received");

    let response = handlers::handle_request(&request, &core).await;
    if let Err(e) = transport.send_message(&response.into()).await {
        warn!(method = %request.method, error = %e, "failed to send response");
    }

    metrics::record_request_duration(&request.method, start.elapsed());
}
