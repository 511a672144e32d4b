//! Configuration types for the turn runner.
//!
//! All configuration is loaded from environment variables. The runner needs
//! to know how to reach one reasoning-engine backend (URL, credential, model,
//! sampling), how to retry it, and the per-turn settings the orchestrator
//! receives with every call.

use std::str::FromStr;
use std::time::Duration;

use crate::error::RunnerError;
use crate::retry::RetryPolicy;

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Reasoning-engine backend.
    pub backend: LlmBackendConfig,
    /// Backoff for transient engine failures.
    pub retry: RetryPolicy,
    /// Settings handed to each turn.
    pub turn: TurnSettings,
    /// Directory overriding the built-in prompt templates.
    pub templates_dir: Option<String>,
}

/// Configuration for a single reasoning-engine backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key. `None` makes every turn short-circuit before any request.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget per request.
    pub max_tokens: u32,
}

/// Supported backend wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions with function calling (`OpenAI`,
    /// `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API with tool use.
    Anthropic,
}

impl BackendType {
    /// Default base URL when `LLM_API_URL` is unset.
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Default model when `LLM_MODEL` is unset.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

impl FromStr for BackendType {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(RunnerError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

/// Per-turn settings. Passed into every orchestrator call; nothing here is
/// process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSettings {
    /// Request/execute iterations before a narrative is forced.
    pub max_tool_iterations: u32,
    /// Language the narrative must be written in.
    pub language: String,
    /// Tool names enabled for the turn. `None` enables every registered tool.
    pub enabled_tools: Option<Vec<String>>,
    /// Deadline for the whole turn.
    pub timeout: Duration,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: 5,
            language: "English".to_owned(),
            enabled_tools: None,
            timeout: Duration::from_millis(120_000),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional:
    /// - `LLM_BACKEND` -- `openai` (default), `deepseek`, `ollama`, `anthropic`, `claude`
    /// - `LLM_API_URL` -- base URL (default depends on the backend)
    /// - `LLM_API_KEY` -- credential; when unset, turns fail without a request
    /// - `LLM_MODEL` -- model id (default depends on the backend)
    /// - `LLM_TEMPERATURE` -- sampling temperature (default 0.8)
    /// - `LLM_MAX_TOKENS` -- completion budget (default 2048)
    /// - `MAX_TOOL_ITERATIONS` -- tool loop cap (default 5)
    /// - `TURN_TIMEOUT_MS` -- whole-turn deadline (default 120000)
    /// - `RETRY_MAX_RETRIES` -- retries per request (default 3)
    /// - `RETRY_INITIAL_DELAY_MS` -- first backoff delay (default 1000)
    /// - `RETRY_MAX_DELAY_MS` -- backoff cap (default 10000)
    /// - `RETRY_BACKOFF_FACTOR` -- backoff multiplier (default 2)
    /// - `ENABLED_TOOLS` -- comma-separated tool names (default: all)
    /// - `NARRATIVE_LANGUAGE` -- narrative language (default `English`)
    /// - `TEMPLATES_DIR` -- prompt template override directory
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, RunnerError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend_type = match var("LLM_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendType::OpenAi,
        };
        let backend = LlmBackendConfig {
            backend_type,
            api_url: var("LLM_API_URL").map_or_else(
                || backend_type.default_api_url().to_owned(),
                |url| url.trim().trim_end_matches('/').to_owned(),
            ),
            api_key: var("LLM_API_KEY"),
            model: var("LLM_MODEL").unwrap_or_else(|| backend_type.default_model().to_owned()),
            temperature: parsed(&var, "LLM_TEMPERATURE", 0.8)?,
            max_tokens: parsed(&var, "LLM_MAX_TOKENS", 2048)?,
        };

        let retry = RetryPolicy {
            max_retries: parsed(&var, "RETRY_MAX_RETRIES", 3)?,
            initial_delay: Duration::from_millis(parsed(&var, "RETRY_INITIAL_DELAY_MS", 1000)?),
            max_delay: Duration::from_millis(parsed(&var, "RETRY_MAX_DELAY_MS", 10_000)?),
            backoff_factor: parsed(&var, "RETRY_BACKOFF_FACTOR", 2)?,
        };

        let max_tool_iterations: u32 = parsed(&var, "MAX_TOOL_ITERATIONS", 5)?;
        if max_tool_iterations == 0 {
            return Err(RunnerError::Config("MAX_TOOL_ITERATIONS must be at least 1".to_owned()));
        }
        let turn = TurnSettings {
            max_tool_iterations,
            language: var("NARRATIVE_LANGUAGE").unwrap_or_else(|| "English".to_owned()),
            enabled_tools: var("ENABLED_TOOLS").map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            }),
            timeout: Duration::from_millis(parsed(&var, "TURN_TIMEOUT_MS", 120_000)?),
        };

        Ok(Self {
            backend,
            retry,
            turn,
            templates_dir: var("TEMPLATES_DIR"),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parsed<T, V>(var: &V, name: &str, default: T) -> Result<T, RunnerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    var(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid {name}: {e}")))
    })
}
