//! Error types for the `storyloom-world` crate.
//!
//! Structural problems found in a state are reported as [`WorldError`]
//! values. Tools turn them into human-readable rejection messages; the
//! invariant checker collects them into a list.

use storyloom_types::EntityId;

/// Structural problems in the entity graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// An id does not resolve to any location, player, or object.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Two entities share the same id.
    #[error("duplicate entity id: {0}")]
    DuplicateId(EntityId),

    /// A parent reference points at nothing.
    #[error("{entity} has dangling parent reference {parent}")]
    DanglingParent {
        /// The child holding the reference.
        entity: EntityId,
        /// The unresolved parent id.
        parent: EntityId,
    },

    /// Following parent references from an entity leads back to it.
    #[error("containment cycle through {entity}: {path}")]
    ContainmentCycle {
        /// An entity on the cycle.
        entity: EntityId,
        /// The cycle rendered as `a -> b -> a`.
        path: String,
    },

    /// A travel edge names a location that does not exist.
    #[error("location {location} connects to unknown location {target}")]
    UnknownTravelTarget {
        /// The location declaring the edge.
        location: EntityId,
        /// The missing endpoint.
        target: EntityId,
    },
}
