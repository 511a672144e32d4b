//! Error types for the tool engine.
//!
//! Rejections are not errors: a tool that refuses a request returns a
//! [`ToolOutcome`](crate::ToolOutcome) with the unchanged state. [`ToolError`]
//! covers faults the caller could not have prevented by sending better
//! arguments.

/// Unexpected faults inside a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No unused object id could be generated.
    #[error("could not allocate a unique object id after {attempts} attempts")]
    IdExhausted {
        /// How many candidates were tried.
        attempts: u32,
    },

    /// An entity resolved by the index vanished from the cloned state.
    #[error("internal state inconsistency: {0}")]
    Inconsistent(String),
}
