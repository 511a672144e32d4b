//! Containment-graph algorithms.
//!
//! Every player and object names a single parent through `connection_id`.
//! Following those references upward normally ends at a location (the
//! entity's root). A chain can also stop early (unparented or dangling) or,
//! in a corrupted document, loop. All walks here carry a visited set so a
//! loop is reported instead of followed forever.

use std::collections::BTreeSet;

use storyloom_types::{EntityId, Location, Slot};

use crate::error::WorldError;
use crate::index::WorldIndex;

/// How an upward walk through the containment graph ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd<'a> {
    /// Reached a location.
    Location(&'a Location),
    /// The last link has no parent.
    Unparented,
    /// The last link names a parent that does not exist.
    Dangling(&'a EntityId),
    /// The walk revisited this id.
    Cycle(&'a EntityId),
}

/// Result of walking from an entity up to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentChain<'a> {
    /// The starting entity followed by each player/object ancestor, nearest
    /// first. Empty when the walk started at a location.
    pub links: Vec<&'a EntityId>,
    /// Where the walk stopped.
    pub end: ChainEnd<'a>,
}

impl<'a> ContainmentChain<'a> {
    /// The root location, if the walk reached one.
    pub const fn root(&self) -> Option<&'a Location> {
        match self.end {
            ChainEnd::Location(location) => Some(location),
            _ => None,
        }
    }

    /// Whether the walk detected a cycle.
    pub const fn is_cycle(&self) -> bool {
        matches!(self.end, ChainEnd::Cycle(_))
    }

    /// Render the chain as `Coin -> Box -> Alice -> Office`.
    pub fn render(&self, index: &WorldIndex<'_>) -> String {
        let mut names: Vec<String> = self
            .links
            .iter()
            .map(|id| index.display_name(id.as_str()).to_owned())
            .collect();
        match self.end {
            ChainEnd::Location(location) => names.push(location.name.clone()),
            ChainEnd::Dangling(id) => names.push(format!("<missing {id}>")),
            ChainEnd::Cycle(id) => names.push(index.display_name(id.as_str()).to_owned()),
            ChainEnd::Unparented => {}
        }
        names.join(" -> ")
    }
}

/// Walk upward from `id` until a location, a missing parent, or a repeat.
///
/// # Errors
///
/// Returns [`WorldError::EntityNotFound`] if `id` itself does not resolve.
pub fn trace_chain<'a>(
    index: &WorldIndex<'a>,
    id: &str,
) -> Result<ContainmentChain<'a>, WorldError> {
    if let Some(location) = index.location(id) {
        return Ok(ContainmentChain {
            links: Vec::new(),
            end: ChainEnd::Location(location),
        });
    }
    let Some(mut current) = index.entity(id) else {
        return Err(WorldError::EntityNotFound(EntityId::from(id)));
    };

    let mut links = Vec::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();

    let end = loop {
        visited.insert(current.id.as_str());
        links.push(&current.id);

        let Some(parent) = current.connection_id.as_ref() else {
            break ChainEnd::Unparented;
        };
        if visited.contains(parent.as_str()) {
            break ChainEnd::Cycle(parent);
        }
        if let Some(location) = index.location(parent.as_str()) {
            break ChainEnd::Location(location);
        }
        match index.entity(parent.as_str()) {
            Some(next) => current = next,
            None => break ChainEnd::Dangling(parent),
        }
    };

    Ok(ContainmentChain { links, end })
}

/// The location an entity ultimately sits in, if its chain reaches one.
pub fn root_location<'a>(index: &WorldIndex<'a>, id: &str) -> Option<&'a Location> {
    trace_chain(index, id).ok().and_then(|chain| chain.root())
}

/// Check whether placing `entity_id` under `new_parent_id` would close a loop.
///
/// Walks upward from the proposed parent. If `entity_id` shows up on that
/// walk, the move would make the entity its own ancestor; the returned path
/// runs from the proposed parent up to and including the entity. Returns
/// `None` when the move is acyclic. A pre-existing loop above the new parent
/// that does not pass through the entity ends the walk without a verdict.
pub fn cycle_path_for_move(
    index: &WorldIndex<'_>,
    entity_id: &str,
    new_parent_id: &str,
) -> Option<Vec<EntityId>> {
    let mut path = Vec::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut current = new_parent_id;

    loop {
        path.push(EntityId::from(current));
        if current == entity_id {
            return Some(path);
        }
        if !visited.insert(current) {
            return None;
        }
        current = index.parent_of(current)?.as_str();
    }
}

/// Slots of the players and objects whose parent is exactly `id`.
pub fn direct_children(index: &WorldIndex<'_>, id: &str) -> Vec<Slot> {
    index
        .placeables()
        .filter(|(_, entity)| entity.connection_id.as_ref().is_some_and(|p| p.as_str() == id))
        .map(|(slot, _)| slot)
        .collect()
}

/// Where the direct children of a deleted object should go: the deleted
/// object's own parent, or `None` (unparented) when it has no parent or the
/// parent no longer resolves.
pub fn reparent_target(index: &WorldIndex<'_>, deleted_id: &str) -> Option<EntityId> {
    index
        .parent_of(deleted_id)
        .filter(|parent| index.contains(parent.as_str()))
        .cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storyloom_types::{Entity, GameState, Location, World};

    use super::*;

    /// Office <- Alice <- Backpack <- Pouch <- Coin, plus a loose Note.
    fn nested() -> GameState {
        GameState {
            world: World::default(),
            locations: vec![Location::new("loc_001", "Office")],
            players: vec![Entity::new("char_001", "Alice").inside("loc_001")],
            objects: vec![
                Entity::new("obj_pack", "Backpack").inside("char_001"),
                Entity::new("obj_pouch", "Pouch").inside("obj_pack"),
                Entity::new("obj_coin", "Coin").inside("obj_pouch"),
                Entity::new("obj_note", "Note"),
            ],
        }
    }

    #[test]
    fn chain_reaches_root_location() {
        let state = nested();
        let index = WorldIndex::new(&state);
        let chain = trace_chain(&index, "obj_coin").unwrap();
        assert_eq!(chain.root().map(|l| l.name.as_str()), Some("Office"));
        assert_eq!(chain.links.len(), 4);
        assert_eq!(chain.render(&index), "Coin -> Pouch -> Backpack -> Alice -> Office");
    }

    #[test]
    fn chain_from_location_is_its_own_root() {
        let state = nested();
        let index = WorldIndex::new(&state);
        let chain = trace_chain(&index, "loc_001");
        assert!(chain.is_ok_and(|c| c.links.is_empty() && c.root().is_some()));
    }

    #[test]
    fn chain_reports_unparented_and_dangling() {
        let mut state = nested();
        state.objects.push(Entity::new("obj_lost", "Lost Key").inside("obj_gone"));
        let index = WorldIndex::new(&state);

        let note = trace_chain(&index, "obj_note");
        assert!(note.is_ok_and(|c| c.end == ChainEnd::Unparented));

        let lost = trace_chain(&index, "obj_lost");
        assert!(lost.is_ok_and(|c| matches!(c.end, ChainEnd::Dangling(id) if id.as_str() == "obj_gone")));
    }

    #[test]
    fn chain_detects_existing_cycle() {
        let mut state = nested();
        state.objects.push(Entity::new("obj_a", "A").inside("obj_b"));
        state.objects.push(Entity::new("obj_b", "B").inside("obj_a"));
        let index = WorldIndex::new(&state);
        let chain = trace_chain(&index, "obj_a");
        assert!(chain.is_ok_and(|c| c.is_cycle()));
        assert_eq!(root_location(&index, "obj_a"), None);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let state = nested();
        let index = WorldIndex::new(&state);
        assert_eq!(
            trace_chain(&index, "nope"),
            Err(WorldError::EntityNotFound(EntityId::from("nope")))
        );
    }

    #[test]
    fn moving_ancestor_into_descendant_is_cyclic() {
        let state = nested();
        let index = WorldIndex::new(&state);
        let path = cycle_path_for_move(&index, "char_001", "obj_coin");
        let rendered: Vec<String> = path
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, ["obj_coin", "obj_pouch", "obj_pack", "char_001"]);
    }

    #[test]
    fn moving_into_unrelated_container_is_acyclic() {
        let state = nested();
        let index = WorldIndex::new(&state);
        assert_eq!(cycle_path_for_move(&index, "obj_note", "obj_pouch"), None);
        assert_eq!(cycle_path_for_move(&index, "obj_coin", "loc_001"), None);
    }

    #[test]
    fn self_parenting_is_cyclic() {
        let state = nested();
        let index = WorldIndex::new(&state);
        assert!(cycle_path_for_move(&index, "obj_pack", "obj_pack").is_some());
    }

    #[test]
    fn direct_children_only() {
        let state = nested();
        let index = WorldIndex::new(&state);
        let children = direct_children(&index, "obj_pack");
        assert_eq!(children.len(), 1);
        assert_eq!(
            children.first().and_then(|s| state.entity_at(*s)).map(|e| e.name.as_str()),
            Some("Pouch")
        );
    }

    #[test]
    fn reparent_target_prefers_own_parent() {
        let state = nested();
        let index = WorldIndex::new(&state);
        assert_eq!(
            reparent_target(&index, "obj_pouch"),
            Some(EntityId::from("obj_pack"))
        );
        assert_eq!(reparent_target(&index, "obj_note"), None);
    }

    #[test]
    fn reparent_target_ignores_dangling_parent() {
        let mut state = nested();
        state.objects.push(Entity::new("obj_lost", "Lost Box").inside("obj_gone"));
        let index = WorldIndex::new(&state);
        assert_eq!(reparent_target(&index, "obj_lost"), None);
    }
}
