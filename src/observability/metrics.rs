//! Metrics collection for `ChillMCP`.
//!
//! Prometheus-compatible metrics for requests, breaks, and the current
//! stress/alert levels. The `metrics` macros are no-ops until a recorder
//! is installed, so recording is always safe to call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ChillError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// MCP methods this server answers, used for label cardinality protection.
///
/// Anything else is bucketed as `"__unknown__"` so client-controlled
/// method names cannot grow the label set.
const KNOWN_METHODS: [&str; 4] = ["initialize", "ping", "tools/list", "tools/call"];

/// Sanitizes a method name for use as a metrics label.
#[must_use]
pub fn sanitize_method_label(method: &str) -> &str {
    if KNOWN_METHODS.contains(&method) {
        method
    } else {
        "__unknown__"
    }
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `ChillError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), ChillError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| ChillError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "chillmcp_requests_total",
        "Total number of MCP requests received"
    );
    describe_histogram!(
        "chillmcp_request_duration_ms",
        "Request processing duration in milliseconds"
    );
    describe_counter!("chillmcp_breaks_total", "Break tools invoked, by tool");
    describe_counter!(
        "chillmcp_delays_total",
        "Mandated delays imposed because the boss alert was maxed"
    );
    describe_gauge!("chillmcp_stress_level", "Current agent stress level (0-100)");
    describe_gauge!("chillmcp_boss_alert_level", "Current boss alert level (0-5)");
}

/// Records an incoming MCP request.
pub fn record_request(method: &str) {
    let label = sanitize_method_label(method);
    counter!("chillmcp_requests_total", "method" => label.to_owned()).increment(1);
}

/// Records request processing duration.
pub fn record_request_duration(method: &str, duration: Duration) {
    let label = sanitize_method_label(method);
    histogram!("chillmcp_request_duration_ms", "method" => label.to_owned())
        .record(duration.as_secs_f64() * 1000.0);
}

/// Records a break taken through `tool`.
///
/// Tool names come from the fixed catalog, never from client input.
pub fn record_break(tool: &'static str) {
    counter!("chillmcp_breaks_total", "tool" => tool).increment(1);
}

/// Records a mandated delay.
pub fn record_delay() {
    counter!("chillmcp_delays_total").increment(1);
}

/// Publishes the current stress and alert levels.
pub fn set_levels(stress: u8, alert: u8) {
    gauge!("chillmcp_stress_level").set(f64::from(stress));
    gauge!("chillmcp_boss_alert_level").set(f64::from(alert));
}

/// Publishes the current alert level alone (cooldown steps).
pub fn set_alert_level(alert: u8) {
    gauge!("chillmcp_boss_alert_level").set(f64::from(alert));
}
