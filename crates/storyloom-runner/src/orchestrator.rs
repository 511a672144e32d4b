//! The turn orchestrator: from a player's action to narrative and new state.
//!
//! A turn moves through `AwaitingModel -> {DispatchingTools -> AwaitingModel}*
//! -> Narrating -> Done`:
//!
//! 1. Send the action with the system instruction and enabled tool schemas.
//! 2. While the engine asks for tools (and the iteration cap allows), run
//!    them one at a time against the running state, feed the results and the
//!    updated state back, and ask again.
//! 3. Ask for a narrative with tools disabled, falling back to the last model
//!    text and finally to a fixed placeholder.
//!
//! The caller's state is never modified. Tool rejections, unknown tools, and
//! tool faults become log entries; only a missing credential, a failed or
//! empty first response, and a timeout fail the turn, and a failed turn
//! returns the original state.

use std::borrow::Cow;

use storyloom_tools::{Dispatch, OutcomeKind, ToolOutcome, ToolRegistry};
use storyloom_types::{EntityId, GameState, ToolArgs, ToolCall, ToolLog, TurnResult, TurnStatus};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::TurnSettings;
use crate::engine::{Candidate, EngineRequest, Message, Part, ReasoningEngine};
use crate::error::EngineError;
use crate::prompt::PromptEngine;
use crate::symbols::SymbolTable;

/// Narrative returned when no credential is configured.
pub const CREDENTIAL_NARRATIVE: &str = "CRITICAL ERROR: no API key is configured for the \
     reasoning engine. Set LLM_API_KEY and try again. The world has not changed.";

/// Narrative returned when the first engine request fails.
pub const FAILURE_NARRATIVE: &str = "The story falters: the narrator could not be reached. \
     Nothing has changed; please try your action again.";

/// Narrative returned when a turn exceeds its deadline.
pub const TIMEOUT_NARRATIVE: &str = "The story stalls: the narrator took too long to answer. \
     Nothing has changed; please try your action again.";

/// Narrative used when every extraction path comes back empty.
pub const PLACEHOLDER_NARRATIVE: &str = "A moment passes. The world waits for what you do next.";

/// One player action to process.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// State at the start of the turn.
    pub state: GameState,
    /// The player's free-text action.
    pub user_text: String,
    /// Settings for this turn.
    pub settings: TurnSettings,
}

/// Drives turns against a reasoning engine.
#[derive(Debug)]
pub struct Orchestrator<E> {
    engine: E,
    registry: ToolRegistry,
    prompts: PromptEngine,
}

/// What one tool call produced.
struct Execution {
    result: String,
    created_id: Option<EntityId>,
    next_state: Option<GameState>,
}

impl<E: ReasoningEngine> Orchestrator<E> {
    /// Create an orchestrator.
    pub const fn new(engine: E, registry: ToolRegistry, prompts: PromptEngine) -> Self {
        Self { engine, registry, prompts }
    }

    /// The underlying engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Run a turn under the request's deadline. On timeout the turn fails
    /// and the original state comes back.
    pub async fn play_turn(&self, request: &TurnRequest) -> TurnResult {
        let deadline = request.settings.timeout;
        match timeout(deadline, self.run_turn(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = deadline.as_millis(), "turn timed out");
                failed(&request.state, TIMEOUT_NARRATIVE, format!("turn exceeded {deadline:?}"))
            }
        }
    }

    /// Run a turn to completion without a deadline.
    pub async fn run_turn(&self, request: &TurnRequest) -> TurnResult {
        let original = &request.state;
        let settings = &request.settings;
        info!(engine = self.engine.name(), action = request.user_text, "turn started");

        if !self.engine.has_credential() {
            warn!(engine = self.engine.name(), "no credential configured; skipping turn");
            return failed(
                original,
                CREDENTIAL_NARRATIVE,
                EngineError::MissingCredential.to_string(),
            );
        }

        let registry = settings
            .enabled_tools
            .as_ref()
            .map_or_else(|| self.registry.clone(), |names| self.registry.subset(names));
        let schemas = registry.schemas();

        let system = match self.prompts.system_instruction(original, settings, &schemas) {
            Ok(system) => system,
            Err(e) => {
                warn!(error = %e, "system instruction could not be rendered");
                return failed(original, FAILURE_NARRATIVE, e.to_string());
            }
        };

        let mut messages = vec![Message::user(request.user_text.as_str())];
        let first = self
            .engine
            .send(&EngineRequest { system: &system, messages: &messages, tools: &schemas })
            .await
            .and_then(|response| response.into_first().ok_or(EngineError::EmptyResponse));
        let mut candidate = match first {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, "first engine request failed");
                return failed(original, FAILURE_NARRATIVE, e.to_string());
            }
        };

        let mut state: Cow<'_, GameState> = Cow::Borrowed(original);
        let mut tool_logs: Vec<ToolLog> = Vec::new();
        let mut symbols = SymbolTable::new();
        let mut last_text: Option<String> = None;
        let mut iteration: u32 = 0;

        while !candidate.tool_calls.is_empty() {
            iteration = iteration.saturating_add(1);
            remember_text(&mut last_text, &candidate);
            messages.push(Message::model(&candidate));

            let mut results = Vec::with_capacity(candidate.tool_calls.len());
            for call in &candidate.tool_calls {
                let args = symbols.resolve(&call.args);
                let execution = self.execute(&registry, &state, call, &args, iteration);
                if let Some(id) = execution.created_id {
                    symbols.record(tool_logs.len(), id);
                }
                if let Some(next) = execution.next_state {
                    state = Cow::Owned(next);
                }
                results.push(Part::ToolResult {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    content: execution.result.clone(),
                });
                tool_logs.push(ToolLog {
                    name: call.name.clone(),
                    args,
                    result: execution.result,
                    iteration,
                });
            }
            match self.prompts.state_context(&state) {
                Ok(context) => results.push(Part::Text(context)),
                Err(e) => warn!(error = %e, "state context could not be rendered"),
            }
            messages.push(Message::tool_results(results));

            if iteration >= settings.max_tool_iterations {
                warn!(iteration, "tool iteration cap reached; forcing narrative");
                candidate = Candidate::default();
                break;
            }

            let request = EngineRequest { system: &system, messages: &messages, tools: &schemas };
            candidate = match self.engine.send(&request).await {
                Ok(response) => response.into_first().unwrap_or_else(|| {
                    warn!(iteration, "engine returned no candidates; moving to narrative");
                    Candidate::default()
                }),
                Err(e) => {
                    warn!(iteration, error = %e, "engine request failed; moving to narrative");
                    Candidate::default()
                }
            };
        }

        let pending_text = candidate.text();
        let narrative = if tool_logs.is_empty() && !pending_text.is_empty() {
            pending_text
        } else {
            if !pending_text.is_empty() {
                messages.push(Message::model(&candidate));
            }
            remember_text(&mut last_text, &candidate);
            match self.narrate(&system, &mut messages, settings).await {
                Some(narrative) => narrative,
                None => last_text.unwrap_or_else(|| PLACEHOLDER_NARRATIVE.to_owned()),
            }
        };

        info!(tool_calls = tool_logs.len(), iterations = iteration, "turn completed");
        TurnResult {
            narrative,
            tool_logs,
            new_state: state.into_owned(),
            status: TurnStatus::Completed,
        }
    }

    /// Dispatch one call against the running state.
    fn execute(
        &self,
        registry: &ToolRegistry,
        state: &GameState,
        call: &ToolCall,
        args: &ToolArgs,
        iteration: u32,
    ) -> Execution {
        match registry.dispatch(&call.name, state, args) {
            Dispatch::NotFound => {
                info!(tool = call.name, iteration, "tool not found");
                Execution {
                    result: format!("Tool not found: {}", call.name),
                    created_id: None,
                    next_state: None,
                }
            }
            Dispatch::Failed(message) => {
                warn!(tool = call.name, iteration, error = message, "tool execution failed");
                Execution {
                    result: format!("Execution error: {message}"),
                    created_id: None,
                    next_state: None,
                }
            }
            Dispatch::Completed(outcome) => {
                let ToolOutcome { state: outcome_state, message, created_id, kind } = outcome;
                info!(tool = call.name, iteration, kind = ?kind, result = message, "tool dispatched");
                Execution {
                    result: message,
                    created_id,
                    next_state: (kind == OutcomeKind::Applied).then(|| outcome_state.into_owned()),
                }
            }
        }
    }

    /// Ask for prose with tools disabled. `None` if nothing usable came back.
    async fn narrate(
        &self,
        system: &str,
        messages: &mut Vec<Message>,
        settings: &TurnSettings,
    ) -> Option<String> {
        let instruction = match self.prompts.narrative_instruction(settings) {
            Ok(instruction) => instruction,
            Err(e) => {
                warn!(error = %e, "narrative instruction could not be rendered");
                return None;
            }
        };
        messages.push(Message::user(instruction));

        let request = EngineRequest { system, messages: messages.as_slice(), tools: &[] };
        match self.engine.send(&request).await {
            Ok(response) => {
                let text = response.into_first().map(|c| c.text()).unwrap_or_default();
                if text.is_empty() {
                    warn!("narrative request returned no text");
                    None
                } else {
                    debug!(chars = text.len(), "narrative received");
                    Some(text)
                }
            }
            Err(e) => {
                warn!(error = %e, "narrative request failed");
                None
            }
        }
    }
}

fn remember_text(last_text: &mut Option<String>, candidate: &Candidate) {
    let text = candidate.text();
    if !text.is_empty() {
        *last_text = Some(text);
    }
}

fn failed(original: &GameState, narrative: &str, reason: String) -> TurnResult {
    TurnResult {
        narrative: narrative.to_owned(),
        tool_logs: Vec::new(),
        new_state: original.clone(),
        status: TurnStatus::Failed { reason },
    }
}
