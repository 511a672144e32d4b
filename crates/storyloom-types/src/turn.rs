//! Wire types for tool invocations and turn results.
//!
//! These are the shapes exchanged with the reasoning engine (tool calls) and
//! handed back to the UI layer at the end of a turn (tool logs, narrative,
//! resulting state).

use serde::{Deserialize, Serialize};

use crate::state::GameState;

/// Arguments of a tool invocation, as a JSON object.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// A tool invocation requested by the reasoning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Engine-assigned call id, echoed back with the result.
    #[serde(default)]
    pub id: String,
    /// Registered tool name.
    pub name: String,
    /// Arguments as supplied by the engine.
    #[serde(default)]
    pub args: ToolArgs,
}

/// One immutable entry in a turn's tool-call log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolLog {
    /// Tool name as requested.
    pub name: String,
    /// Arguments after symbol resolution.
    pub args: ToolArgs,
    /// Human-readable result fed back to the engine.
    pub result: String,
    /// 1-based iteration of the request/execute loop that issued the call.
    pub iteration: u32,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TurnStatus {
    /// The turn ran to completion (tools may still have been rejected).
    Completed,
    /// The turn failed before producing a normal narrative; the returned
    /// state is the caller's original state.
    Failed {
        /// Why the turn failed.
        reason: String,
    },
}

impl TurnStatus {
    /// Whether the turn failed.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Everything a turn hands back to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    /// Prose narrative for the player.
    pub narrative: String,
    /// Every tool invocation of the turn, in execution order.
    pub tool_logs: Vec<ToolLog>,
    /// State after the last successful tool application.
    pub new_state: GameState,
    /// Completion status.
    pub status: TurnStatus,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_call_defaults_missing_args() {
        let call: ToolCall = serde_json::from_value(json!({"name": "move_object"}))
            .unwrap_or_else(|_| ToolCall {
                id: "bad".to_owned(),
                name: String::new(),
                args: ToolArgs::new(),
            });
        assert_eq!(call.name, "move_object");
        assert!(call.args.is_empty());
        assert!(call.id.is_empty());
    }

    #[test]
    fn turn_result_uses_camel_case() {
        let result = TurnResult {
            narrative: "The door creaks.".to_owned(),
            tool_logs: Vec::new(),
            new_state: GameState::default(),
            status: TurnStatus::Completed,
        };
        let value = serde_json::to_value(&result).unwrap_or_default();
        assert!(value.get("toolLogs").is_some());
        assert!(value.get("newState").is_some());
        assert_eq!(value.pointer("/status/kind"), Some(&json!("completed")));
    }

    #[test]
    fn failed_status_reports_failure() {
        let status = TurnStatus::Failed { reason: "no candidates".to_owned() };
        assert!(status.is_failed());
        assert!(!TurnStatus::Completed.is_failed());
    }
}
