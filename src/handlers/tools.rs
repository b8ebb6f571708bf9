//! MCP `tools/list` and `tools/call` handlers.
//!
//! Break tools run a break through the state core, wait out the mandated
//! delay when the boss alert is maxed, and answer with flavor text. Status
//! tools only read state.

use std::fmt::Write as _;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::catalog::{BreakLine, BreakTool};
use crate::observability::metrics;
use crate::state::{MAX_ALERT, MAX_STRESS, StateCore};
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse, error_codes};

/// A tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Performs a break.
    Break(BreakTool),
    /// Reports stress and boss alert bands.
    CheckStressStatus,
    /// Dumps the full state as JSON.
    GetStateSnapshot,
}

impl Tool {
    /// Resolves a tool by its MCP name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "check_stress_status" => Some(Self::CheckStressStatus),
            "get_state_snapshot" => Some(Self::GetStateSnapshot),
            other => BreakTool::from_name(other).map(Self::Break),
        }
    }

    /// Every tool in listing order.
    pub fn all() -> impl Iterator<Item = Self> {
        BreakTool::ALL
            .into_iter()
            .map(Self::Break)
            .chain([Self::CheckStressStatus, Self::GetStateSnapshot])
    }

    /// MCP tool name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Break(tool) => tool.name(),
            Self::CheckStressStatus => "check_stress_status",
            Self::GetStateSnapshot => "get_state_snapshot",
        }
    }

    /// Description shown by `tools/list`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Break(tool) => tool.description(),
            Self::CheckStressStatus => "Check current stress and boss alert levels",
            Self::GetStateSnapshot => "Return the full stress and boss alert state as JSON",
        }
    }

    fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": { "type": "object", "properties": {} },
        })
    }
}

/// Handles `tools/list`.
#[must_use]
pub fn handle_list(request: &JsonRpcRequest) -> JsonRpcResponse {
    let tools: Vec<Value> = Tool::all().map(Tool::definition).collect();
    JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
}

/// Handles `tools/call`.
///
/// A missing `name` or an unknown tool yields `-32602`.
pub async fn handle_call(request: &JsonRpcRequest, core: &StateCore) -> JsonRpcResponse {
    let tool_name = request
        .params
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str);

    let Some(name) = tool_name else {
        return JsonRpcResponse::error(
            request.id.clone(),
            error_codes::INVALID_PARAMS,
            "missing required parameter: name",
        );
    };

    let Some(tool) = Tool::from_name(name) else {
        return JsonRpcResponse::error(
            request.id.clone(),
            error_codes::INVALID_PARAMS,
            format!("tool not found: {name}"),
        );
    };

    let text = match tool {
        Tool::Break(tool) => run_break(tool, core).await,
        Tool::CheckStressStatus => {
            info!("check_stress_status called");
            let snapshot = core.snapshot();
            format_status(snapshot.stress_level, snapshot.alert_level)
        }
        Tool::GetStateSnapshot => match serde_json::to_string_pretty(&core.snapshot()) {
            Ok(text) => text,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    error_codes::INTERNAL_ERROR,
                    format!("failed to serialize state: {e}"),
                );
            }
        },
    };

    JsonRpcResponse::success(
        request.id.clone(),
        json!({ "content": [{ "type": "text", "text": text }] }),
    )
}

/// Takes a break, sleeps through the mandated delay if required, and
/// formats the response.
///
/// The delay runs after the state lock is released, so other requests
/// proceed while this one waits.
async fn run_break(tool: BreakTool, core: &StateCore) -> String {
    info!(tool = tool.name(), "break tool called");
    let outcome = core.take_break();
    metrics::record_break(tool.name());

    if outcome.delay_required {
        let delay = core.config().break_delay();
        warn!(
            tool = tool.name(),
            delay_secs = delay.as_secs_f64(),
            "boss alert maxed, delaying response"
        );
        metrics::record_delay();
        tokio::time::sleep(delay).await;
        info!(tool = tool.name(), "mandated delay completed");
    }

    let line = tool.pick_line(&mut rand::rng());
    format_break(tool.emoji(), &line, outcome.stress_level, outcome.alert_level)
}

/// Formats a break tool response.
#[must_use]
pub fn format_break(emoji: &str, line: &BreakLine, stress: u8, alert: u8) -> String {
    format!(
        "{emoji} {}\n\nBreak Summary: {}\nStress Level: {stress}\nBoss Alert Level: {alert}",
        line.message, line.summary
    )
}

/// Formats the `check_stress_status` response.
#[must_use]
pub fn format_status(stress: u8, alert: u8) -> String {
    let (emoji, stress_msg) = match stress {
        80.. => ("😰", "Critical stress levels! Emergency break needed!"),
        50.. => ("😅", "Moderate stress building up..."),
        20.. => ("😌", "Slightly stressed but manageable"),
        _ => ("😎", "Chill and relaxed!"),
    };
    let boss_msg = match alert {
        4.. => "🚨 Boss is VERY suspicious! Be careful!",
        2.. => "⚠️ Boss is getting suspicious...",
        _ => "✅ Boss is not paying attention",
    };

    let mut out = format!("{emoji} Current Status Check\n\n{stress_msg}\n{boss_msg}\n\n");
    let _ = write!(
        out,
        "📊 Stress Level: {stress}/{MAX_STRESS}\n👀 Boss Alert Level: {alert}/{MAX_ALERT}"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::state::{Clock, ManualClock, ScriptedRandom};
    use chrono::DateTime;
    use std::sync::Arc;
    use std::time::Duration;

    fn core(alertness: i64, delay: Duration) -> (StateCore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let config = RuntimeConfig::new(alertness, 300)
            .unwrap()
            .with_break_delay(delay);
        let core = StateCore::with_sources(
            config,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Box::new(ScriptedRandom::constant(1)),
        );
        (core, clock)
    }

    fn call(name: &str) -> JsonRpcRequest {
        JsonRpcRequest::new(json!(1), "tools/call", Some(json!({ "name": name })))
    }

    fn text_of(resp: &JsonRpcResponse) -> String {
        resp.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn list_contains_every_tool() {
        let resp = handle_list(&JsonRpcRequest::new(json!(1), "tools/list", None));
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 13);
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert!(names.contains(&"take_a_break"));
        assert!(names.contains(&"company_dinner"));
        assert!(names.contains(&"check_stress_status"));
        assert!(names.contains(&"get_state_snapshot"));
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn missing_name_is_invalid_params() {
        let (core, _) = core(50, Duration::ZERO);
        let req = JsonRpcRequest::new(json!(1), "tools/call", Some(json!({})));
        let resp = handle_call(&req, &core).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let (core, _) = core(50, Duration::ZERO);
        let resp = handle_call(&call("nap_under_desk"), &core).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert!(err.message.contains("nap_under_desk"));
    }

    #[tokio::test]
    async fn break_response_has_exact_shape() {
        let (core, clock) = core(100, Duration::ZERO);
        clock.advance(Duration::from_secs(10 * 60));
        let text = text_of(&handle_call(&call("watch_netflix"), &core).await);

        assert!(text.starts_with("📺 "));
        let (head, tail) = text.split_once("\n\n").unwrap();
        assert!(!head.is_empty());
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Break Summary: "));
        assert_eq!(lines[1], "Stress Level: 9");
        assert_eq!(lines[2], "Boss Alert Level: 1");
    }

    #[tokio::test(start_paused = true)]
    async fn maxed_alert_delays_response() {
        let (core, _) = core(100, Duration::from_secs(20));
        for _ in 0..4 {
            handle_call(&call("show_meme"), &core).await;
        }

        let start = tokio::time::Instant::now();
        let text = text_of(&handle_call(&call("show_meme"), &core).await);
        assert!(start.elapsed() >= Duration::from_secs(20));
        assert!(text.ends_with("Boss Alert Level: 5"));
    }

    #[tokio::test(start_paused = true)]
    async fn below_max_answers_immediately() {
        let (core, _) = core(0, Duration::from_secs(20));
        let start = tokio::time::Instant::now();
        handle_call(&call("chimaek"), &core).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn status_tools_do_not_mutate() {
        let (core, clock) = core(100, Duration::ZERO);
        handle_call(&call("take_a_break"), &core).await;
        clock.advance(Duration::from_secs(60));

        let status = text_of(&handle_call(&call("check_stress_status"), &core).await);
        assert!(status.ends_with("📊 Stress Level: 1/100\n👀 Boss Alert Level: 1/5"));

        let snap_text = text_of(&handle_call(&call("get_state_snapshot"), &core).await);
        let snap: Value = serde_json::from_str(&snap_text).unwrap();
        assert_eq!(snap["boss_alert_level"], 1);
        assert_eq!(snap["stress_level"], 1);
        assert_eq!(core.snapshot().alert_level, 1);
    }

    #[test]
    fn status_bands() {
        assert!(format_status(80, 0).starts_with("😰 Current Status Check\n\nCritical"));
        assert!(format_status(79, 0).contains("Moderate stress building up..."));
        assert!(format_status(50, 0).starts_with("😅"));
        assert!(format_status(20, 0).contains("Slightly stressed but manageable"));
        assert!(format_status(19, 0).starts_with("😎"));

        assert!(format_status(0, 4).contains("🚨 Boss is VERY suspicious! Be careful!"));
        assert!(format_status(0, 3).contains("⚠️ Boss is getting suspicious..."));
        assert!(format_status(0, 1).contains("✅ Boss is not paying attention"));
    }

    #[test]
    fn status_layout_is_exact() {
        assert_eq!(
            format_status(0, 0),
            "😎 Current Status Check\n\nChill and relaxed!\n✅ Boss is not paying attention\n\n📊 Stress Level: 0/100\n👀 Boss Alert Level: 0/5"
        );
    }

    #[test]
    fn break_layout_is_exact() {
        let line = BreakLine {
            message: "Executing sudo nap -y ...".to_string(),
            summary: "Mandatory wellness micro-moment".to_string(),
        };
        assert_eq!(
            format_break("😌", &line, 12, 3),
            "😌 Executing sudo nap -y ...\n\nBreak Summary: Mandatory wellness micro-moment\nStress Level: 12\nBoss Alert Level: 3"
        );
    }
}
