//! `move_object`: re-parent a player or object.

use storyloom_types::{EntityId, EntityKind, GameState, ToolArgs};
use storyloom_world::{WorldIndex, cycle_path_for_move};

use super::render_path;
use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Place an object or player inside a location, player, or object.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveObject;

impl Tool for MoveObject {
    fn name(&self) -> &'static str {
        "move_object"
    }

    fn description(&self) -> &'static str {
        "Move an object (or a player) into a location, into a player's inventory, or into \
         another object. Use this when something is picked up, dropped, handed over, or put \
         inside a container. The move is refused if it would place something inside itself."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("objectId", "ID of the object or player to move")
            .required("targetId", "ID of the location, player, or object that will contain it")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let object_id = args::text_any(args, &["objectId", "entityId"]);
        let target_id = args::text_any(args, &["targetId", "connectionId"]);
        let (Some(object_id), Some(target_id)) = (object_id, target_id) else {
            return Ok(ToolOutcome::rejected(state, "Object ID and target ID are required"));
        };

        let index = WorldIndex::new(state);
        let Some(slot) = index.slot(&object_id) else {
            return Ok(ToolOutcome::rejected(state, format!("Object not found: {object_id}")));
        };
        let name = index.display_name(&object_id);
        if slot.kind == EntityKind::Location {
            return Ok(ToolOutcome::rejected(state, format!("Locations cannot be moved: {name}")));
        }
        if !index.contains(&target_id) {
            return Ok(ToolOutcome::rejected(state, format!("Target not found: {target_id}")));
        }
        let target_name = index.display_name(&target_id);

        if object_id == target_id {
            return Ok(ToolOutcome::rejected(state, format!("Cannot move {name} into itself")));
        }

        let current_parent = index.parent_of(&object_id);
        if current_parent.is_some_and(|p| p.as_str() == target_id) {
            return Ok(ToolOutcome::unchanged(state, format!("{name} is already in {target_name}")));
        }

        if let Some(path) = cycle_path_for_move(&index, &object_id, &target_id) {
            return Ok(ToolOutcome::rejected(
                state,
                format!(
                    "Cannot move {name} into {target_name}: {target_name} is inside {name} ({})",
                    render_path(&index, &path)
                ),
            ));
        }

        let from = current_parent.map_or("nowhere", |p| index.display_name(p.as_str()));
        let message = format!("Moved {name} from {from} to {target_name}");

        let mut next = state.clone();
        let entity = next
            .entity_at_mut(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{object_id} missing from clone")))?;
        entity.connection_id = Some(EntityId::new(target_id));
        Ok(ToolOutcome::applied(next, message))
    }
}
