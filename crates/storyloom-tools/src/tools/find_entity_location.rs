//! `find_entity_location`: read-only containment lookup.

use storyloom_types::{GameState, ToolArgs};
use storyloom_world::{ChainEnd, WorldIndex, trace_chain};

use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Report which location ultimately holds an entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindEntityLocation;

impl Tool for FindEntityLocation {
    fn name(&self) -> &'static str {
        "find_entity_location"
    }

    fn description(&self) -> &'static str {
        "Look up where a player or object is, following containers up to the location \
         that holds them. Does not change anything."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object().required("entityId", "ID of the player or object to find")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let Some(entity_id) = args::text_any(args, &["entityId", "objectId", "playerId"]) else {
            return Ok(ToolOutcome::rejected(state, "Entity ID is required"));
        };

        let index = WorldIndex::new(state);
        if !index.contains(&entity_id) {
            return Ok(ToolOutcome::rejected(state, format!("Entity not found: {entity_id}")));
        }
        let name = index.display_name(&entity_id);
        if index.location(&entity_id).is_some() {
            return Ok(ToolOutcome::unchanged(state, format!("{name} ({entity_id}) is a location")));
        }

        let chain =
            trace_chain(&index, &entity_id).map_err(|e| ToolError::Inconsistent(e.to_string()))?;
        let path = chain.render(&index);
        let outcome = match chain.end {
            ChainEnd::Location(location) => ToolOutcome::unchanged(
                state,
                format!(
                    "{name} is in {} ({}). Containment path: {path}",
                    location.name, location.id
                ),
            ),
            ChainEnd::Unparented => ToolOutcome::unchanged(
                state,
                format!("{name} is not inside any location. Containment path: {path}"),
            ),
            ChainEnd::Dangling(missing) => ToolOutcome::unchanged(
                state,
                format!(
                    "{name} is not inside any location: {missing} does not exist. \
                     Containment path: {path}"
                ),
            ),
            ChainEnd::Cycle(_) => ToolOutcome::rejected(
                state,
                format!("Containment cycle detected for {name}: {path}"),
            ),
        };
        Ok(outcome)
    }
}
