//! Command-line entry point: play one turn against a state file.
//!
//! ```text
//! storyloom-runner <state.json> <action text...>
//! ```
//!
//! Loads the game state, runs one turn with the backend configured in the
//! environment, and prints the turn result as JSON on stdout. Logs go to
//! stderr; set `LOG_FORMAT=json` for structured output.

use anyhow::{Context, bail};
use storyloom_runner::{
    Orchestrator, PromptEngine, ReasoningEngine, RunnerConfig, TurnRequest, create_backend,
};
use storyloom_tools::ToolRegistry;
use storyloom_types::GameState;
use storyloom_world::check_invariants;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(state_path) = args.next() else {
        bail!("usage: storyloom-runner <state.json> <action text...>");
    };
    let action = args.collect::<Vec<_>>().join(" ");
    if action.trim().is_empty() {
        bail!("usage: storyloom-runner <state.json> <action text...>");
    }

    let raw = std::fs::read_to_string(&state_path)
        .with_context(|| format!("failed to read {state_path}"))?;
    let state: GameState = serde_json::from_str(&raw)
        .with_context(|| format!("{state_path} is not a valid game state"))?;
    for violation in check_invariants(&state) {
        warn!(%violation, "game state violates an invariant");
    }

    let config = RunnerConfig::from_env().context("failed to load configuration")?;
    let prompts = PromptEngine::load(config.templates_dir.as_deref())?;
    let engine = create_backend(&config.backend, config.retry);
    info!(
        backend = engine.name(),
        model = config.backend.model,
        max_tool_iterations = config.turn.max_tool_iterations,
        timeout_ms = config.turn.timeout.as_millis(),
        "configuration loaded"
    );

    let orchestrator = Orchestrator::new(engine, ToolRegistry::standard(), prompts);
    let request = TurnRequest { state, user_text: action, settings: config.turn };
    let result = orchestrator.play_turn(&request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Install the global subscriber: human-readable by default, JSON when
/// `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
