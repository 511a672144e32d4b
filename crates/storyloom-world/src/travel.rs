//! Travel-graph adjacency.
//!
//! An edge may be declared on either endpoint. Travel from `A` to `B` is
//! legal when `A` declares `B` as `out` or `bidirectional`, or when `B`
//! declares `A` as `in` or `bidirectional`.

use storyloom_types::Location;

use crate::index::WorldIndex;

/// Whether a direction-aware edge allows travelling from `from` to `to`.
pub fn has_travel_edge(from: &Location, to: &Location) -> bool {
    let declared_on_origin = from
        .connections
        .iter()
        .any(|c| c.location_id == to.id && c.direction.allows_exit());
    let declared_on_target = to
        .connections
        .iter()
        .any(|c| c.location_id == from.id && c.direction.allows_entry());
    declared_on_origin || declared_on_target
}

/// Every location reachable in one step from `from`, in document order.
pub fn reachable_from<'a>(index: &WorldIndex<'a>, from: &Location) -> Vec<&'a Location> {
    index
        .state()
        .locations
        .iter()
        .filter(|candidate| candidate.id != from.id && has_travel_edge(from, candidate))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storyloom_types::{Direction, GameState, Location, World};

    use super::*;

    fn map() -> GameState {
        GameState {
            world: World::default(),
            locations: vec![
                Location::new("loc_hall", "Hall")
                    .connected_to("loc_office", Direction::Bidirectional)
                    .connected_to("loc_street", Direction::Out),
                Location::new("loc_office", "Office"),
                Location::new("loc_street", "Street"),
                Location::new("loc_vault", "Vault").connected_to("loc_office", Direction::In),
            ],
            players: Vec::new(),
            objects: Vec::new(),
        }
    }

    fn pair<'a>(state: &'a GameState, a: &str, b: &str) -> Option<(&'a Location, &'a Location)> {
        Some((state.location(a)?, state.location(b)?))
    }

    #[test]
    fn bidirectional_edge_works_both_ways() {
        let state = map();
        assert!(pair(&state, "loc_hall", "loc_office").is_some_and(|(a, b)| has_travel_edge(a, b)));
        assert!(pair(&state, "loc_office", "loc_hall").is_some_and(|(a, b)| has_travel_edge(a, b)));
    }

    #[test]
    fn out_edge_is_one_way() {
        let state = map();
        assert!(pair(&state, "loc_hall", "loc_street").is_some_and(|(a, b)| has_travel_edge(a, b)));
        assert!(pair(&state, "loc_street", "loc_hall").is_some_and(|(a, b)| !has_travel_edge(a, b)));
    }

    #[test]
    fn in_edge_declared_on_target() {
        let state = map();
        assert!(pair(&state, "loc_office", "loc_vault").is_some_and(|(a, b)| has_travel_edge(a, b)));
        assert!(pair(&state, "loc_vault", "loc_office").is_some_and(|(a, b)| !has_travel_edge(a, b)));
    }

    #[test]
    fn unconnected_locations() {
        let state = map();
        assert!(pair(&state, "loc_street", "loc_vault").is_some_and(|(a, b)| !has_travel_edge(a, b)));
    }

    #[test]
    fn reachable_lists_exits() {
        let state = map();
        let index = WorldIndex::new(&state);
        let hall = state.location("loc_hall").unwrap();
        let names: Vec<&str> = reachable_from(&index, hall)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["Office", "Street"]);
    }
}
