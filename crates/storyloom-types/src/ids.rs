//! Entity identifiers.
//!
//! Ids are opaque strings (`loc_001`, `char_001`, `obj_1718000000000_x7k2`)
//! shared by all three entity collections, because a containment parent may
//! be a location, a player, or an object. [`EntityKind`] records which
//! collection an id resolved to.

use serde::{Deserialize, Serialize};

/// Identifier of a location, player, or object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The collection an [`EntityId`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A node of the travel graph and a containment root.
    Location,
    /// A player character.
    Player,
    /// An item, container, or any other placeable thing.
    Object,
}

impl EntityKind {
    /// Capitalized label used in tool result messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::Player => "Player",
            Self::Object => "Object",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Serde adapter for optional parent references.
///
/// The document format uses an empty string for "unparented"; in memory that
/// is `None`. Whitespace-only ids are treated as empty.
pub(crate) mod parent_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::EntityId;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(id: &Option<EntityId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(id.as_ref().map_or("", EntityId::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EntityId>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(EntityId))
    }
}
