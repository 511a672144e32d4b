//! Entity index and graph algorithms for the Storyloom narrative engine.
//!
//! This crate reads a [`GameState`] and answers structural questions about
//! it. It never mutates state; the tool engine decides what to change and
//! consults these algorithms first.
//!
//! # Modules
//!
//! - [`containment`] -- Ancestor walks, root-location resolution, cycle
//!   checks for moves, and reparent targets for deletion.
//! - [`error`] -- Error types for structural violations.
//! - [`index`] -- [`WorldIndex`], an id-keyed view over a borrowed state.
//! - [`invariants`] -- Whole-state integrity checks.
//! - [`travel`] -- Direction-aware adjacency on the travel graph.
//!
//! [`GameState`]: storyloom_types::GameState

pub mod containment;
pub mod error;
pub mod index;
pub mod invariants;
pub mod travel;

// Re-export primary types at crate root.
pub use containment::{
    ChainEnd, ContainmentChain, cycle_path_for_move, direct_children, reparent_target,
    root_location, trace_chain,
};
pub use error::WorldError;
pub use index::WorldIndex;
pub use invariants::{check_invariants, unrooted_entities};
pub use travel::{has_travel_edge, reachable_from};
