//! CLI command dispatch.

pub mod serve;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;

/// Dispatch a parsed CLI invocation to its command handler.
///
/// A bare invocation with no subcommand runs the server.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => serve::run(&args, cancel).await,
        Some(Commands::Version(args)) => version::run(&args),
        None => serve::run(&cli.serve, cancel).await,
    }
}
