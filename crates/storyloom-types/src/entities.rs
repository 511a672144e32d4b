//! World, location, and placeable-entity records.
//!
//! Two independent graphs live in these records:
//!
//! - The **travel graph**: [`Location::connections`], directed edges between
//!   locations used only to decide whether a player may walk somewhere.
//! - The **containment graph**: [`Entity::connection_id`], the single parent
//!   of every player and object. A parent may be a location, a player, or an
//!   object.

use serde::{Deserialize, Serialize};

use crate::attributes::{self, Attributes};
use crate::ids::{EntityId, parent_ref};

/// Singleton descriptive record for the whole world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    /// Genre label, e.g. "noir detective".
    #[serde(default)]
    pub genre: String,
    /// Free-form description of the setting.
    #[serde(default)]
    pub description: String,
}

/// Direction of a travel-graph edge, relative to the declaring location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Travel is possible from the other location into the declaring one.
    In,
    /// Travel is possible from the declaring location to the other one.
    Out,
    /// Travel is possible both ways.
    #[default]
    Bidirectional,
}

impl Direction {
    /// Whether this edge allows leaving the declaring location.
    pub const fn allows_exit(self) -> bool {
        matches!(self, Self::Out | Self::Bidirectional)
    }

    /// Whether this edge allows arriving at the declaring location.
    pub const fn allows_entry(self) -> bool {
        matches!(self, Self::In | Self::Bidirectional)
    }
}

/// A travel-graph edge declared on a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// The location at the other end of the edge.
    pub location_id: EntityId,
    /// Which way the edge can be travelled.
    #[serde(default)]
    pub direction: Direction,
}

/// A place in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Unique, stable identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Static description.
    #[serde(default)]
    pub description: String,
    /// What is happening here right now.
    #[serde(default)]
    pub current_situation: String,
    /// Outgoing and incoming travel edges.
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Narrative attributes.
    #[serde(default, deserialize_with = "attributes::deserialize")]
    pub attributes: Attributes,
}

/// Shared shape of players and objects.
///
/// Both are placeable: they hang off exactly one parent through
/// `connection_id`, or float unparented when it is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique identifier; never reused once issued.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Containment parent: a location, player, or object id.
    #[serde(default, with = "parent_ref")]
    pub connection_id: Option<EntityId>,
    /// Narrative attributes.
    #[serde(default, deserialize_with = "attributes::deserialize")]
    pub attributes: Attributes,
    /// Legacy single-field state, written only by the `change_*_state` tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Entity {
    /// Create an unparented entity with no attributes.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            connection_id: None,
            attributes: Attributes::new(),
            state: None,
        }
    }

    /// Builder-style parent assignment.
    #[must_use]
    pub fn inside(mut self, parent: impl Into<EntityId>) -> Self {
        self.connection_id = Some(parent.into());
        self
    }

    /// Builder-style attribute assignment.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A player character.
pub type Player = Entity;

/// An item, container, or other placeable thing.
pub type Object = Entity;

impl Location {
    /// Create a location with no connections or attributes.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            current_situation: String::new(),
            connections: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style travel edge.
    #[must_use]
    pub fn connected_to(mut self, location_id: impl Into<EntityId>, direction: Direction) -> Self {
        self.connections.push(Connection {
            location_id: location_id.into(),
            direction,
        });
        self
    }
}
