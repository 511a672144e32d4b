//! Shared type definitions for the Storyloom narrative engine.
//!
//! This crate is the single source of truth for the data that flows between
//! the world graph, the tool engine, and the turn runner. Every type here is
//! plain data with `serde` support; the JSON shape is camelCase to match the
//! game-state documents produced by editors and stored by the host.
//!
//! # Modules
//!
//! - [`ids`] -- The [`EntityId`] wrapper and [`EntityKind`] discriminant
//! - [`attributes`] -- Narrative attribute maps and their normalization
//! - [`entities`] -- [`World`], [`Location`], [`Connection`], and the shared
//!   [`Entity`] shape used by players and objects
//! - [`state`] -- The [`GameState`] aggregate root
//! - [`turn`] -- Tool-call, tool-log, and turn-result wire types

pub mod attributes;
pub mod entities;
pub mod ids;
pub mod state;
pub mod turn;

// Re-export all public types at crate root for convenience.
pub use attributes::{Attributes, normalize_attributes};
pub use entities::{Connection, Direction, Entity, Location, Object, Player, World};
pub use ids::{EntityId, EntityKind};
pub use state::{GameState, Slot};
pub use turn::{ToolArgs, ToolCall, ToolLog, TurnResult, TurnStatus};
