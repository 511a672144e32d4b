//! The [`Tool`] trait and the statically built [`ToolRegistry`].
//!
//! The registry is an ordered list of tools keyed by name. It is the single
//! source of truth for both what is advertised to the reasoning engine
//! ([`ToolRegistry::schemas`]) and what can be dispatched
//! ([`ToolRegistry::dispatch`]).

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use storyloom_types::{GameState, ToolArgs};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::schema::{ParameterSchema, ToolSchema};
use crate::tools;

/// A named, schema-described state transition.
pub trait Tool: Send + Sync {
    /// Registered name, as the reasoning engine calls it.
    fn name(&self) -> &'static str;

    /// When and how to use the tool.
    fn description(&self) -> &'static str;

    /// Argument schema.
    fn parameters(&self) -> ParameterSchema;

    /// Apply the tool to `state`.
    ///
    /// Must not modify `state`; returns it unchanged (borrowed) on rejection
    /// or a modified clone on success.
    fn apply<'a>(&self, state: &'a GameState, args: &ToolArgs)
    -> Result<ToolOutcome<'a>, ToolError>;

    /// Full schema for the reasoning engine.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }
}

/// Result of dispatching a call by name.
#[derive(Debug)]
pub enum Dispatch<'a> {
    /// No enabled tool has that name.
    NotFound,
    /// The tool ran; it may still have rejected the request.
    Completed(ToolOutcome<'a>),
    /// The tool returned an error or panicked.
    Failed(String),
}

/// Ordered collection of tools keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: BTreeMap<&'static str, usize>,
}

impl core::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

impl ToolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the canonical tool set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for tool in tools::canonical() {
            registry.register(tool);
        }
        registry
    }

    /// Add a tool. A later registration with the same name replaces the
    /// earlier one in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if let Some(&position) = self.by_name.get(name) {
            if let Some(existing) = self.tools.get_mut(position) {
                *existing = tool;
            }
            return;
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
    }

    /// A registry restricted to `enabled` names, keeping registration order.
    /// Unknown names are ignored.
    pub fn subset<S: AsRef<str>>(&self, enabled: &[S]) -> Self {
        let mut restricted = Self::new();
        for tool in &self.tools {
            if enabled.iter().any(|name| name.as_ref() == tool.name()) {
                restricted.register(Arc::clone(tool));
            }
        }
        restricted
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).and_then(|&i| self.tools.get(i))
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Schemas of every registered tool, in order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the tool called `name` against `state`.
    ///
    /// Errors and panics inside the tool are contained here and reported as
    /// [`Dispatch::Failed`]; the caller's state is never affected.
    pub fn dispatch<'a>(&self, name: &str, state: &'a GameState, args: &ToolArgs) -> Dispatch<'a> {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "requested tool is not registered");
            return Dispatch::NotFound;
        };

        match catch_unwind(AssertUnwindSafe(|| tool.apply(state, args))) {
            Ok(Ok(outcome)) => {
                debug!(tool = name, kind = ?outcome.kind, message = outcome.message, "tool applied");
                Dispatch::Completed(outcome)
            }
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "tool returned an error");
                Dispatch::Failed(e.to_string())
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool panicked".to_owned());
                warn!(tool = name, panic = message, "tool panicked");
                Dispatch::Failed(message)
            }
        }
    }
}
