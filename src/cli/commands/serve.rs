//! `serve` command handler.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::args::ServeArgs;
use crate::config::RuntimeConfig;
use crate::dashboard;
use crate::error::Result;
use crate::server::{Server, ServerOptions};
use crate::state::StateCore;
use crate::transport::{StdioTransport, Transport};

/// Validates the runtime settings from `args`.
///
/// # Errors
///
/// Returns a configuration error for out-of-range values.
pub fn runtime_config(args: &ServeArgs) -> Result<RuntimeConfig> {
    let config = RuntimeConfig::new(args.boss_alertness, args.boss_alertness_cooldown)?
        .with_break_delay(Duration::from_secs(args.break_delay_secs));
    Ok(config)
}

/// Start the MCP server on stdio.
///
/// # Errors
///
/// Returns a configuration error for invalid settings, or an I/O or
/// transport error if a listener cannot be bound or stdio fails.
pub async fn run(args: &ServeArgs, cancel: CancellationToken) -> Result<()> {
    let config = runtime_config(args)?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let core = Arc::new(StateCore::new(config));

    let dashboard_cancel = cancel.child_token();
    let dashboard_task = match args.dashboard.as_deref() {
        Some(bind) => {
            let (handle, addr) =
                dashboard::serve(bind, Arc::clone(&core), dashboard_cancel.clone()).await?;
            tracing::info!(%addr, "dashboard started");
            Some(handle)
        }
        None => None,
    };

    let transport: Arc<dyn Transport> = Arc::new(StdioTransport::new());
    let server = Server::new(ServerOptions {
        core,
        transport,
        cancel: cancel.clone(),
    });
    let result = server.run().await;

    if let Some(handle) = dashboard_task {
        dashboard_cancel.cancel();
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "dashboard task failed");
        }
    }

    result
}
