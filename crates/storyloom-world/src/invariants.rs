//! Whole-state integrity checks.
//!
//! Tools keep these invariants by construction. The checker exists for
//! documents that arrive from outside (editors, storage) and for tests that
//! assert every reachable state stays well-formed.

use std::collections::BTreeSet;

use storyloom_types::{EntityId, GameState};

use crate::containment::{ChainEnd, trace_chain};
use crate::error::WorldError;
use crate::index::WorldIndex;

/// Collect every structural violation in `state`.
///
/// Checks id uniqueness across all collections, that every parent reference
/// resolves, that containment is acyclic, and that travel edges name real
/// locations. An empty result means the state is well-formed.
pub fn check_invariants(state: &GameState) -> Vec<WorldError> {
    let mut errors = Vec::new();

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for id in state.ids() {
        if !seen.insert(id.as_str()) {
            errors.push(WorldError::DuplicateId(id.clone()));
        }
    }

    let index = WorldIndex::new(state);
    let mut reported_cycles: BTreeSet<&str> = BTreeSet::new();

    for (_, entity) in index.placeables() {
        let Ok(chain) = trace_chain(&index, entity.id.as_str()) else {
            continue;
        };
        match chain.end {
            ChainEnd::Dangling(parent) if entity.connection_id.as_ref() == Some(parent) => {
                errors.push(WorldError::DanglingParent {
                    entity: entity.id.clone(),
                    parent: parent.clone(),
                });
            }
            ChainEnd::Cycle(repeated) if !reported_cycles.contains(repeated.as_str()) => {
                reported_cycles.extend(chain.links.iter().map(|id| id.as_str()));
                errors.push(WorldError::ContainmentCycle {
                    entity: repeated.clone(),
                    path: chain.render(&index),
                });
            }
            _ => {}
        }
    }

    for location in &state.locations {
        for connection in &location.connections {
            if index.location(connection.location_id.as_str()).is_none() {
                errors.push(WorldError::UnknownTravelTarget {
                    location: location.id.clone(),
                    target: connection.location_id.clone(),
                });
            }
        }
    }

    errors
}

/// Ids of entities whose chain does not end at a location.
pub fn unrooted_entities(state: &GameState) -> Vec<EntityId> {
    let index = WorldIndex::new(state);
    index
        .placeables()
        .filter(|(_, entity)| {
            trace_chain(&index, entity.id.as_str())
                .ok()
                .and_then(|chain| chain.root())
                .is_none()
        })
        .map(|(_, entity)| entity.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use storyloom_types::{Direction, Entity, Location, World};

    use super::*;

    fn valid() -> GameState {
        GameState {
            world: World::default(),
            locations: vec![
                Location::new("loc_001", "Office").connected_to("loc_002", Direction::Out),
                Location::new("loc_002", "Hall"),
            ],
            players: vec![Entity::new("char_001", "Alice").inside("loc_001")],
            objects: vec![Entity::new("obj_1", "Bag").inside("char_001")],
        }
    }

    #[test]
    fn valid_state_has_no_violations() {
        assert!(check_invariants(&valid()).is_empty());
        assert!(unrooted_entities(&valid()).is_empty());
    }

    #[test]
    fn detects_duplicates_and_dangling_parents() {
        let mut state = valid();
        state.objects.push(Entity::new("obj_1", "Second Bag"));
        state.objects.push(Entity::new("obj_2", "Cup").inside("obj_missing"));
        let errors = check_invariants(&state);
        assert!(errors.contains(&WorldError::DuplicateId(EntityId::from("obj_1"))));
        assert!(errors.contains(&WorldError::DanglingParent {
            entity: EntityId::from("obj_2"),
            parent: EntityId::from("obj_missing"),
        }));
    }

    #[test]
    fn detects_cycles_once() {
        let mut state = valid();
        state.objects.push(Entity::new("obj_a", "A").inside("obj_b"));
        state.objects.push(Entity::new("obj_b", "B").inside("obj_a"));
        let cycles = check_invariants(&state)
            .into_iter()
            .filter(|e| matches!(e, WorldError::ContainmentCycle { .. }))
            .count();
        assert_eq!(cycles, 1);
        assert_eq!(unrooted_entities(&state).len(), 2);
    }

    #[test]
    fn detects_unknown_travel_target() {
        let mut state = valid();
        state.locations.push(Location::new("loc_003", "Roof").connected_to("loc_404", Direction::In));
        assert!(matches!(
            check_invariants(&state).as_slice(),
            [WorldError::UnknownTravelTarget { .. }]
        ));
    }
}
