//! State-transition tools for the Storyloom narrative engine.
//!
//! A tool is a pure function from `(state, args)` to a [`ToolOutcome`]: the
//! unchanged state plus a message when the request is invalid, or a modified
//! clone plus a confirmation when it succeeds. Expected failures (missing
//! arguments, unknown ids, cycles, illegal travel) are never errors; only
//! internal faults surface as [`ToolError`].
//!
//! # Modules
//!
//! - [`args`] -- Lenient extraction of string arguments.
//! - [`error`] -- [`ToolError`] for unexpected internal faults.
//! - [`id_alloc`] -- Fresh, collision-checked object ids.
//! - [`outcome`] -- [`ToolOutcome`] and its copy-on-write state.
//! - [`registry`] -- The [`Tool`] trait and [`ToolRegistry`].
//! - [`schema`] -- Parameter schemas advertised to the reasoning engine.
//! - [`tools`] -- The canonical tool set.

pub mod args;
pub mod error;
pub mod id_alloc;
pub mod outcome;
pub mod registry;
pub mod schema;
pub mod tools;

pub use error::ToolError;
pub use outcome::{OutcomeKind, ToolOutcome};
pub use registry::{Dispatch, Tool, ToolRegistry};
pub use schema::{ParameterSchema, PropertySchema, ToolSchema};
