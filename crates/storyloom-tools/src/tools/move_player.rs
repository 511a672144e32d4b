//! `move_player`: travel between connected locations.
//!
//! Travel is strict: the player's current location is resolved through the
//! containment chain, and the target must be directly reachable from it.
//! A player tucked inside an object (hiding in a wardrobe, riding a cart)
//! travels from the location that ultimately holds them, and ends up
//! standing directly in the target location.

use storyloom_types::{EntityKind, GameState, ToolArgs};
use storyloom_world::{ChainEnd, WorldIndex, has_travel_edge, reachable_from, trace_chain};

use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Move a player to an adjacent location.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovePlayer;

impl Tool for MovePlayer {
    fn name(&self) -> &'static str {
        "move_player"
    }

    fn description(&self) -> &'static str {
        "Move a player to a different location. The target must be connected to the \
         player's current location in a direction that allows travel. Use move_object \
         instead to put a player inside an object."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("playerId", "ID of the player who travels")
            .required("targetLocationId", "ID of the destination location")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let player_id = args::text_any(args, &["playerId", "characterId"]);
        let target_id = args::text_any(args, &["targetLocationId", "locationId", "targetId"]);
        let (Some(player_id), Some(target_id)) = (player_id, target_id) else {
            return Ok(ToolOutcome::rejected(
                state,
                "Player ID and target location ID are required",
            ));
        };

        let index = WorldIndex::new(state);
        let Some(slot) = index.slot(&player_id).filter(|s| s.kind == EntityKind::Player) else {
            return Ok(ToolOutcome::rejected(state, format!("Player not found: {player_id}")));
        };
        let name = index.display_name(&player_id);

        let Some(target) = index.location(&target_id) else {
            let message = if index.contains(&target_id) {
                format!(
                    "{} is not a location; use move_object to put {name} inside it",
                    index.display_name(&target_id)
                )
            } else {
                format!("Location not found: {target_id}")
            };
            return Ok(ToolOutcome::rejected(state, message));
        };

        let chain = trace_chain(&index, &player_id)
            .map_err(|e| ToolError::Inconsistent(e.to_string()))?;
        let current = match chain.end {
            ChainEnd::Location(location) => location,
            ChainEnd::Cycle(_) => {
                return Ok(ToolOutcome::rejected(
                    state,
                    format!(
                        "Cannot determine where {name} is: containment cycle ({})",
                        chain.render(&index)
                    ),
                ));
            }
            ChainEnd::Unparented | ChainEnd::Dangling(_) => {
                return Ok(ToolOutcome::rejected(
                    state,
                    format!("Cannot determine where {name} is: not inside any location"),
                ));
            }
        };

        if current.id == target.id {
            return Ok(ToolOutcome::unchanged(
                state,
                format!("{name} is already at {}", target.name),
            ));
        }

        if !has_travel_edge(current, target) {
            let exits: Vec<&str> = reachable_from(&index, current)
                .into_iter()
                .map(|l| l.name.as_str())
                .collect();
            let exits = if exits.is_empty() { "none".to_owned() } else { exits.join(", ") };
            return Ok(ToolOutcome::rejected(
                state,
                format!(
                    "{name} cannot travel from {} to {}: no connection leads there. \
                     Reachable from {}: {exits}",
                    current.name, target.name, current.name
                ),
            ));
        }

        let mut message = format!("{name} travelled from {} to {}", current.name, target.name);
        if let Some(container) = index.parent_of(&player_id).filter(|p| **p != current.id) {
            message.push_str(&format!(" (leaving {})", index.display_name(container.as_str())));
        }

        let mut next = state.clone();
        let player = next
            .entity_at_mut(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{player_id} missing from clone")))?;
        player.connection_id = Some(target.id.clone());
        Ok(ToolOutcome::applied(next, message))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::outcome::OutcomeKind;
    use crate::tools::fixtures::{args, parent_of, world};

    fn run<'a>(state: &'a GameState, player: &str, target: &str) -> ToolOutcome<'a> {
        MovePlayer
            .apply(state, &args(json!({"playerId": player, "targetLocationId": target})))
            .unwrap_or_else(|e| ToolOutcome::rejected(state, e.to_string()))
    }

    #[test]
    fn travels_along_bidirectional_connection() {
        let state = world();
        let outcome = run(&state, "char_001", "loc_002");
        assert_eq!(outcome.kind, OutcomeKind::Applied);
        assert_eq!(outcome.message, "Alice travelled from Office to Hallway");
        assert_eq!(parent_of(&outcome.state, "char_001"), Some("loc_002"));
        // Carried items follow implicitly.
        assert_eq!(parent_of(&outcome.state, "obj_bag"), Some("char_001"));
        assert_eq!(parent_of(&state, "char_001"), Some("loc_001"));
    }

    #[test]
    fn honours_connection_direction() {
        let state = world();
        // Office declares Street as `out`.
        assert_eq!(run(&state, "char_001", "loc_003").kind, OutcomeKind::Applied);
        // Basement declares Office as `in`, so Office -> Basement is allowed.
        assert_eq!(run(&state, "char_001", "loc_004").kind, OutcomeKind::Applied);
    }

    #[test]
    fn rejects_unconnected_target_and_lists_exits() {
        let mut state = world();
        state.players.push(storyloom_types::Entity::new("char_003", "Carol").inside("loc_003"));
        let outcome = run(&state, "char_003", "loc_001");
        assert_eq!(outcome.kind, OutcomeKind::Rejected);
        assert!(outcome.message.starts_with("Carol cannot travel from Street to Office"));
        assert!(outcome.message.ends_with("Reachable from Street: none"));
        assert_eq!(*outcome.state, state);
    }

    #[test]
    fn nested_player_leaves_container() {
        let state = world();
        let outcome = run(&state, "char_002", "loc_001");
        assert_eq!(outcome.kind, OutcomeKind::Applied);
        assert_eq!(outcome.message, "Bob travelled from Hallway to Office (leaving Wardrobe)");
        assert_eq!(parent_of(&outcome.state, "char_002"), Some("loc_001"));
    }

    #[test]
    fn already_there_is_a_no_op() {
        let state = world();
        let outcome = run(&state, "char_001", "loc_001");
        assert_eq!(outcome.kind, OutcomeKind::Unchanged);
        assert_eq!(outcome.message, "Alice is already at Office");
    }

    #[test]
    fn target_must_be_a_location() {
        let state = world();
        assert_eq!(run(&state, "char_001", "loc_404").message, "Location not found: loc_404");
        assert_eq!(
            run(&state, "char_001", "obj_desk").message,
            "Desk is not a location; use move_object to put Alice inside it"
        );
        assert_eq!(run(&state, "obj_desk", "loc_002").message, "Player not found: obj_desk");
    }
}
