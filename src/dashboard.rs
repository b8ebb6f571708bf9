//! Read-only HTTP view of the state core.
//!
//! `GET /api/state` returns the current snapshot wrapped as
//! `{"status": "ok", "snapshot": ...}`; `GET /health` is a liveness probe.
//! Both go through [`StateCore::snapshot`], so polling never changes the
//! boss alert level or the break timer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::state::StateCore;

/// Builds the dashboard router.
pub fn router(core: Arc<StateCore>) -> Router {
    Router::new()
        .route("/api/state", get(handle_state))
        .route("/health", get(handle_health))
        .with_state(core)
}

async fn handle_state(State(core): State<Arc<StateCore>>) -> Json<Value> {
    let snapshot = core.snapshot();
    Json(json!({ "status": "ok", "snapshot": snapshot }))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Binds the dashboard and serves it until `cancel` fires.
///
/// Returns the serving task and the address actually bound (useful when
/// binding port 0).
///
/// # Errors
///
/// Returns [`TransportError::ConnectionFailed`] if the address is invalid
/// or cannot be bound.
pub async fn serve(
    bind: &str,
    core: Arc<StateCore>,
    cancel: CancellationToken,
) -> Result<(JoinHandle<()>, SocketAddr), TransportError> {
    let addr = parse_bind_addr(bind)?;
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| TransportError::ConnectionFailed(format!("bind failed: {e}")))?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| TransportError::ConnectionFailed(format!("local_addr failed: {e}")))?;
    info!(addr = %bound_addr, "dashboard listening");

    let app = router(core);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .ok();
        debug!("dashboard shut down");
    });

    Ok((handle, bound_addr))
}

/// Parses a bind address from `[host:]port` format.
///
/// - `":8080"` → `"0.0.0.0:8080"`
/// - `"8080"` → `"0.0.0.0:8080"`
/// - `"127.0.0.1:8080"` → `"127.0.0.1:8080"`
///
/// # Errors
///
/// Returns [`TransportError::ConnectionFailed`] if the result is not a
/// valid socket address.
pub fn parse_bind_addr(input: &str) -> Result<String, TransportError> {
    let addr = if input.starts_with(':') {
        format!("0.0.0.0{input}")
    } else if input.parse::<u16>().is_ok() {
        format!("0.0.0.0:{input}")
    } else {
        input.to_string()
    };
    addr.parse::<SocketAddr>().map_err(|e| {
        TransportError::ConnectionFailed(format!("invalid bind address \"{input}\": {e}"))
    })?;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::state::{Clock, ManualClock, ScriptedRandom};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::DateTime;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn test_core() -> (Arc<StateCore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let core = StateCore::with_sources(
            RuntimeConfig::new(100, 60).unwrap(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Box::new(ScriptedRandom::constant(1)),
        );
        (Arc::new(core), clock)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn parse_bind_addr_colon_port() {
        assert_eq!(parse_bind_addr(":8080").unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn parse_bind_addr_port_only() {
        assert_eq!(parse_bind_addr("8080").unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn parse_bind_addr_full() {
        assert_eq!(parse_bind_addr("127.0.0.1:3000").unwrap(), "127.0.0.1:3000");
    }

    #[test]
    fn parse_bind_addr_invalid() {
        assert!(parse_bind_addr("not-an-address").is_err());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (core, _) = test_core();
        let (status, body) = get_json(router(core), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn state_wraps_snapshot() {
        let (core, clock) = test_core();
        core.take_break();
        clock.advance(Duration::from_secs(5 * 60));

        let (status, body) = get_json(router(Arc::clone(&core)), "/api/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body.get("ok").is_none());
        assert_eq!(body["snapshot"]["stress_level"], 5);
        assert_eq!(body["snapshot"]["boss_alert_level"], 1);
        assert_eq!(body["snapshot"]["boss_alertness"], 100);
        assert_eq!(body["snapshot"]["boss_alertness_cooldown"], 60);
    }

    #[tokio::test]
    async fn polling_does_not_mutate_alert() {
        let (core, _) = test_core();
        core.take_break();
        for _ in 0..5 {
            get_json(router(Arc::clone(&core)), "/api/state").await;
        }
        assert_eq!(core.snapshot().alert_level, 1);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (core, _) = test_core();
        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let resp = router(core).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_binds_and_stops_on_cancel() {
        let (core, _) = test_core();
        let cancel = CancellationToken::new();
        let (handle, addr) = serve("127.0.0.1:0", core, cancel.clone()).await.unwrap();
        assert_ne!(addr.port(), 0);
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("dashboard should stop after cancel")
            .unwrap();
    }
}
