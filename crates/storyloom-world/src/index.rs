//! Id-keyed view over a borrowed [`GameState`].
//!
//! A [`WorldIndex`] is built once per tool invocation and answers lookups in
//! `O(log n)` instead of scanning three vectors. It also records the
//! [`Slot`] of every entity so a tool can mutate the matching element of a
//! cloned state without searching again.

use std::collections::BTreeMap;

use storyloom_types::{Entity, EntityId, EntityKind, GameState, Location, Slot};
use tracing::warn;

/// Read-only lookup structure over a game state.
#[derive(Debug, Clone)]
pub struct WorldIndex<'a> {
    state: &'a GameState,
    slots: BTreeMap<&'a str, Slot>,
}

impl<'a> WorldIndex<'a> {
    /// Index every location, player, and object of `state`.
    ///
    /// Ids are expected to be unique. If a document violates that, the first
    /// occurrence (locations, then players, then objects) wins and a warning
    /// is logged; [`check_invariants`](crate::check_invariants) reports the
    /// duplicate properly.
    pub fn new(state: &'a GameState) -> Self {
        let mut slots = BTreeMap::new();
        let entries = state
            .locations
            .iter()
            .enumerate()
            .map(|(position, l)| (l.id.as_str(), Slot { kind: EntityKind::Location, position }))
            .chain(state.players.iter().enumerate().map(|(position, p)| {
                (p.id.as_str(), Slot { kind: EntityKind::Player, position })
            }))
            .chain(state.objects.iter().enumerate().map(|(position, o)| {
                (o.id.as_str(), Slot { kind: EntityKind::Object, position })
            }));

        for (id, slot) in entries {
            if slots.contains_key(id) {
                warn!(entity_id = id, kind = %slot.kind, "duplicate entity id ignored by index");
                continue;
            }
            slots.insert(id, slot);
        }

        Self { state, slots }
    }

    /// The indexed state.
    pub const fn state(&self) -> &'a GameState {
        self.state
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the state holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Collection and position of `id`.
    pub fn slot(&self, id: &str) -> Option<Slot> {
        self.slots.get(id).copied()
    }

    /// Which collection `id` belongs to.
    pub fn kind(&self, id: &str) -> Option<EntityKind> {
        self.slot(id).map(|s| s.kind)
    }

    /// Whether `id` resolves to anything.
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Location with the given id.
    pub fn location(&self, id: &str) -> Option<&'a Location> {
        self.slot(id).and_then(|slot| self.state.location_at(slot))
    }

    /// Player with the given id.
    pub fn player(&self, id: &str) -> Option<&'a Entity> {
        self.slot(id)
            .filter(|slot| slot.kind == EntityKind::Player)
            .and_then(|slot| self.state.entity_at(slot))
    }

    /// Object with the given id.
    pub fn object(&self, id: &str) -> Option<&'a Entity> {
        self.slot(id)
            .filter(|slot| slot.kind == EntityKind::Object)
            .and_then(|slot| self.state.entity_at(slot))
    }

    /// Player or object with the given id.
    pub fn entity(&self, id: &str) -> Option<&'a Entity> {
        self.slot(id).and_then(|slot| self.state.entity_at(slot))
    }

    /// Display name of any entity.
    pub fn name(&self, id: &str) -> Option<&'a str> {
        self.slot(id).and_then(|slot| self.state.name_at(slot))
    }

    /// Display name, falling back to the raw id for unknown entities.
    pub fn display_name<'s>(&self, id: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.name(id).unwrap_or(id)
    }

    /// Containment parent of a player or object. Locations have none.
    pub fn parent_of(&self, id: &str) -> Option<&'a EntityId> {
        self.entity(id).and_then(|e| e.connection_id.as_ref())
    }

    /// Iterate over every player and object with its slot.
    pub fn placeables(&self) -> impl Iterator<Item = (Slot, &'a Entity)> + use<'a> {
        let players = self
            .state
            .players
            .iter()
            .enumerate()
            .map(|(position, p)| (Slot { kind: EntityKind::Player, position }, p));
        let objects = self
            .state
            .objects
            .iter()
            .enumerate()
            .map(|(position, o)| (Slot { kind: EntityKind::Object, position }, o));
        players.chain(objects)
    }
}

#[cfg(test)]
mod tests {
    use storyloom_types::{Entity, Location, World};

    use super::*;

    fn sample() -> GameState {
        GameState {
            world: World::default(),
            locations: vec![Location::new("loc_001", "Office")],
            players: vec![Entity::new("char_001", "Alice").inside("loc_001")],
            objects: vec![
                Entity::new("obj_box", "Box").inside("char_001"),
                Entity::new("obj_coin", "Coin").inside("obj_box"),
            ],
        }
    }

    #[test]
    fn lookups_respect_kind() {
        let state = sample();
        let index = WorldIndex::new(&state);
        assert_eq!(index.len(), 4);
        assert!(index.location("loc_001").is_some());
        assert!(index.player("char_001").is_some());
        assert!(index.player("obj_box").is_none());
        assert!(index.object("obj_box").is_some());
        assert!(index.entity("loc_001").is_none());
        assert_eq!(index.kind("obj_coin"), Some(EntityKind::Object));
    }

    #[test]
    fn parent_and_names() {
        let state = sample();
        let index = WorldIndex::new(&state);
        assert_eq!(index.parent_of("obj_coin").map(EntityId::as_str), Some("obj_box"));
        assert_eq!(index.parent_of("loc_001"), None);
        assert_eq!(index.name("char_001"), Some("Alice"));
        assert_eq!(index.display_name("ghost"), "ghost");
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut state = sample();
        state.objects.push(Entity::new("char_001", "Impostor"));
        let index = WorldIndex::new(&state);
        assert_eq!(index.kind("char_001"), Some(EntityKind::Player));
        assert_eq!(index.len(), 4);
    }
}
