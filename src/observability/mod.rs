//! Observability module
//!
//! Logging and metrics infrastructure for monitoring `ChillMCP` while it
//! serves break requests.

pub mod logging;
pub mod metrics;

pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
