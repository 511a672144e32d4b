//! The reasoning-engine contract.
//!
//! A reasoning engine receives a system instruction, the conversation so far,
//! and the schemas of the tools it may call, and answers with one or more
//! candidates. Each candidate carries text, tool calls, or both. The
//! conversation types here are vendor-neutral; backends translate them to
//! their own wire formats.

use storyloom_tools::ToolSchema;
use storyloom_types::ToolCall;

use crate::error::EngineError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The player, or the orchestrator speaking on the player's behalf.
    User,
    /// The reasoning engine.
    Model,
    /// Results of tool calls, fed back to the engine.
    Tool,
}

/// One piece of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Plain text.
    Text(String),
    /// A tool invocation requested by the engine.
    ToolCall(ToolCall),
    /// The result of an earlier tool invocation.
    ToolResult {
        /// Id of the call this answers.
        call_id: String,
        /// Tool name.
        name: String,
        /// Result text.
        content: String,
    },
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Content, in order.
    pub parts: Vec<Part>,
}

impl Message {
    /// A user message holding `text`.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![Part::Text(text.into())] }
    }

    /// Replay a candidate as the engine's own message.
    pub fn model(candidate: &Candidate) -> Self {
        let text = candidate.text_parts.iter().cloned().map(Part::Text);
        let calls = candidate.tool_calls.iter().cloned().map(Part::ToolCall);
        Self { role: Role::Model, parts: text.chain(calls).collect() }
    }

    /// A tool-result message. `parts` should be [`Part::ToolResult`]s,
    /// optionally followed by [`Part::Text`] context.
    pub const fn tool_results(parts: Vec<Part>) -> Self {
        Self { role: Role::Tool, parts }
    }
}

/// Everything sent in one engine request.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    /// System instruction.
    pub system: &'a str,
    /// Conversation history, oldest first.
    pub messages: &'a [Message],
    /// Tools the engine may call. Empty means tools are disabled.
    pub tools: &'a [ToolSchema],
}

impl EngineRequest<'_> {
    /// Whether tools are offered in this request.
    pub const fn tools_enabled(&self) -> bool {
        !self.tools.is_empty()
    }
}

/// One alternative answer from the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    /// Text parts in order.
    pub text_parts: Vec<String>,
    /// Requested tool invocations in order.
    pub tool_calls: Vec<ToolCall>,
}

impl Candidate {
    /// Non-blank text parts joined with blank lines.
    pub fn text(&self) -> String {
        self.text_parts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The engine's answer to a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineResponse {
    /// Alternative answers; the orchestrator uses the first.
    pub candidates: Vec<Candidate>,
}

impl EngineResponse {
    /// Response with a single candidate.
    pub fn single(candidate: Candidate) -> Self {
        Self { candidates: vec![candidate] }
    }

    /// The first candidate, if any.
    pub fn into_first(self) -> Option<Candidate> {
        self.candidates.into_iter().next()
    }
}

/// A reasoning engine the orchestrator can drive.
///
/// Implemented by [`LlmBackend`](crate::llm::LlmBackend) for real HTTP
/// backends and by scripted stubs in tests.
pub trait ReasoningEngine: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Whether a credential is configured. Turns short-circuit without one.
    fn has_credential(&self) -> bool;

    /// Send one request.
    fn send(
        &self,
        request: &EngineRequest<'_>,
    ) -> impl Future<Output = Result<EngineResponse, EngineError>> + Send;
}
