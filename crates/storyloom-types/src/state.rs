//! The [`GameState`] aggregate root.
//!
//! All mutation happens by producing a new `GameState` value. Callers hand a
//! shared reference to the tool engine and receive either the same reference
//! back (nothing changed) or an owned, modified clone.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::entities::{Entity, Location, Object, Player, World};
use crate::ids::{EntityId, EntityKind};

/// Position of an entity inside one of the three collections.
///
/// Slots are only meaningful for the state they were resolved against and for
/// clones of it taken before any insertion or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Which collection the entity lives in.
    pub kind: EntityKind,
    /// Index within that collection.
    pub position: usize,
}

/// Complete narrative world state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Descriptive world record.
    #[serde(default)]
    pub world: World,
    /// Every location; seeded at world creation.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Every player character.
    #[serde(default)]
    pub players: Vec<Player>,
    /// Every object.
    #[serde(default)]
    pub objects: Vec<Object>,
}

impl GameState {
    /// Find a location by id.
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id.as_str() == id)
    }

    /// Find a player by id.
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id.as_str() == id)
    }

    /// Find an object by id.
    pub fn object(&self, id: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.id.as_str() == id)
    }

    /// Resolve an id to its collection and position, checking locations,
    /// then players, then objects.
    pub fn slot_of(&self, id: &str) -> Option<Slot> {
        if let Some(position) = self.locations.iter().position(|l| l.id.as_str() == id) {
            return Some(Slot { kind: EntityKind::Location, position });
        }
        if let Some(position) = self.players.iter().position(|p| p.id.as_str() == id) {
            return Some(Slot { kind: EntityKind::Player, position });
        }
        self.objects
            .iter()
            .position(|o| o.id.as_str() == id)
            .map(|position| Slot { kind: EntityKind::Object, position })
    }

    /// The player or object at `slot`. Locations yield `None`.
    pub fn entity_at(&self, slot: Slot) -> Option<&Entity> {
        match slot.kind {
            EntityKind::Location => None,
            EntityKind::Player => self.players.get(slot.position),
            EntityKind::Object => self.objects.get(slot.position),
        }
    }

    /// Mutable access to the player or object at `slot`.
    pub fn entity_at_mut(&mut self, slot: Slot) -> Option<&mut Entity> {
        match slot.kind {
            EntityKind::Location => None,
            EntityKind::Player => self.players.get_mut(slot.position),
            EntityKind::Object => self.objects.get_mut(slot.position),
        }
    }

    /// The location at `slot`, if the slot points into the location list.
    pub fn location_at(&self, slot: Slot) -> Option<&Location> {
        match slot.kind {
            EntityKind::Location => self.locations.get(slot.position),
            _ => None,
        }
    }

    /// Mutable access to the location at `slot`.
    pub fn location_at_mut(&mut self, slot: Slot) -> Option<&mut Location> {
        match slot.kind {
            EntityKind::Location => self.locations.get_mut(slot.position),
            _ => None,
        }
    }

    /// Display name of whatever lives at `slot`.
    pub fn name_at(&self, slot: Slot) -> Option<&str> {
        match slot.kind {
            EntityKind::Location => self.location_at(slot).map(|l| l.name.as_str()),
            _ => self.entity_at(slot).map(|e| e.name.as_str()),
        }
    }

    /// Attribute map of whatever lives at `slot`.
    pub fn attributes_at(&self, slot: Slot) -> Option<&Attributes> {
        match slot.kind {
            EntityKind::Location => self.location_at(slot).map(|l| &l.attributes),
            _ => self.entity_at(slot).map(|e| &e.attributes),
        }
    }

    /// Mutable attribute map of whatever lives at `slot`.
    pub fn attributes_at_mut(&mut self, slot: Slot) -> Option<&mut Attributes> {
        match slot.kind {
            EntityKind::Location => self.location_at_mut(slot).map(|l| &mut l.attributes),
            _ => self.entity_at_mut(slot).map(|e| &mut e.attributes),
        }
    }

    /// Every id issued in this state, across all three collections.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.locations
            .iter()
            .map(|l| &l.id)
            .chain(self.players.iter().map(|p| &p.id))
            .chain(self.objects.iter().map(|o| &o.id))
    }

    /// Whether any collection already uses `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|existing| existing.as_str() == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> GameState {
        GameState {
            world: World::default(),
            locations: vec![Location::new("loc_001", "Office")],
            players: vec![Entity::new("char_001", "Alice").inside("loc_001")],
            objects: vec![Entity::new("obj_1", "Desk").inside("loc_001")],
        }
    }

    #[test]
    fn slot_resolution_covers_all_collections() {
        let state = sample();
        assert_eq!(
            state.slot_of("loc_001"),
            Some(Slot { kind: EntityKind::Location, position: 0 })
        );
        assert_eq!(state.slot_of("char_001").map(|s| s.kind), Some(EntityKind::Player));
        assert_eq!(state.slot_of("obj_1").map(|s| s.kind), Some(EntityKind::Object));
        assert_eq!(state.slot_of("missing"), None);
    }

    #[test]
    fn names_and_attributes_by_slot() {
        let mut state = sample();
        let slot = state.slot_of("obj_1").unwrap();
        assert_eq!(state.name_at(slot), Some("Desk"));
        if let Some(attrs) = state.attributes_at_mut(slot) {
            attrs.insert("condition".to_owned(), "scratched".to_owned());
        }
        assert_eq!(
            state.attributes_at(slot).and_then(|a| a.get("condition")).map(String::as_str),
            Some("scratched")
        );
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let state: GameState =
            serde_json::from_value(json!({"world": {"genre": "fantasy"}})).unwrap_or_default();
        assert_eq!(state.world.genre, "fantasy");
        assert!(state.locations.is_empty());
        assert!(state.objects.is_empty());
    }

    #[test]
    fn contains_id_spans_collections() {
        let state = sample();
        assert!(state.contains_id("char_001"));
        assert!(state.contains_id("loc_001"));
        assert!(!state.contains_id("obj_2"));
    }
}
