//! Turn runner for the Storyloom narrative engine.
//!
//! Takes a player's free-text action and a [`GameState`], lets a reasoning
//! engine change the world through the tool registry, and returns the
//! narrative with the resulting state.
//!
//! # Architecture
//!
//! ```text
//! action --> PromptEngine --> ReasoningEngine <--> ToolRegistry --> narrative + new state
//!                                  |
//!                          LlmBackend (retry/backoff)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment configuration and per-turn settings.
//! - [`engine`] -- The [`ReasoningEngine`] contract and conversation types.
//! - [`error`] -- [`EngineError`] and [`RunnerError`].
//! - [`llm`] -- OpenAI-compatible and Anthropic HTTP backends.
//! - [`orchestrator`] -- The turn state machine.
//! - [`prompt`] -- Template-driven system and narrative instructions.
//! - [`retry`] -- Exponential backoff.
//! - [`symbols`] -- `$N` references to objects created earlier in a turn.
//!
//! [`GameState`]: storyloom_types::GameState

pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod retry;
pub mod symbols;

pub use config::{BackendType, LlmBackendConfig, RunnerConfig, TurnSettings};
pub use engine::{Candidate, EngineRequest, EngineResponse, Message, Part, ReasoningEngine, Role};
pub use error::{EngineError, RunnerError};
pub use llm::{LlmBackend, create_backend};
pub use orchestrator::{Orchestrator, TurnRequest};
pub use prompt::PromptEngine;
pub use retry::{RetryPolicy, retry_with_backoff};
pub use symbols::SymbolTable;
