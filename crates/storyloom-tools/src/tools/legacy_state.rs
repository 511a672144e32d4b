//! Single-field state tools kept for saves written before attributes.
//!
//! Players and objects carry a free-text `state` ("asleep", "on fire");
//! locations carry `currentSituation`. New stories should prefer
//! `set_attribute`, but these remain callable.

use storyloom_types::{EntityKind, GameState, ToolArgs};
use storyloom_world::WorldIndex;

use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Replace the `state` text of a player or object.
fn change_entity_state<'a>(
    state: &'a GameState,
    args: &ToolArgs,
    kind: EntityKind,
    id_key: &str,
) -> Result<ToolOutcome<'a>, ToolError> {
    let Some([entity_id, new_state]) = args::require(args, [id_key, "state"]) else {
        return Ok(ToolOutcome::rejected(
            state,
            format!("{} ID and state are required", kind.label()),
        ));
    };

    let index = WorldIndex::new(state);
    let Some(slot) = index.slot(&entity_id).filter(|s| s.kind == kind) else {
        return Ok(ToolOutcome::rejected(
            state,
            format!("{} not found: {entity_id}", kind.label()),
        ));
    };
    let name = index.display_name(&entity_id);
    let current = state.entity_at(slot).and_then(|e| e.state.as_deref());

    let message = match current {
        Some(old) if old == new_state => {
            return Ok(ToolOutcome::unchanged(state, format!("{name} is already {new_state}")));
        }
        Some(old) => format!("{name} changed from \"{old}\" to \"{new_state}\""),
        None => format!("{name} is now \"{new_state}\""),
    };

    let mut next = state.clone();
    next.entity_at_mut(slot)
        .ok_or_else(|| ToolError::Inconsistent(format!("{entity_id} missing from clone")))?
        .state = Some(new_state);
    Ok(ToolOutcome::applied(next, message))
}

/// Replace a player's `state` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangePlayerState;

impl Tool for ChangePlayerState {
    fn name(&self) -> &'static str {
        "change_player_state"
    }

    fn description(&self) -> &'static str {
        "Change a player's overall state (e.g. \"exhausted\", \"hiding\"). Prefer \
         set_attribute for specific traits."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("playerId", "ID of the player")
            .required("state", "New state, as prose")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        change_entity_state(state, args, EntityKind::Player, "playerId")
    }
}

/// Replace an object's `state` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeObjectState;

impl Tool for ChangeObjectState {
    fn name(&self) -> &'static str {
        "change_object_state"
    }

    fn description(&self) -> &'static str {
        "Change an object's overall state (e.g. \"broken\", \"lit\"). Prefer set_attribute \
         for specific traits."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("objectId", "ID of the object")
            .required("state", "New state, as prose")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        change_entity_state(state, args, EntityKind::Object, "objectId")
    }
}

/// Replace a location's `currentSituation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeLocationState;

impl Tool for ChangeLocationState {
    fn name(&self) -> &'static str {
        "change_location_state"
    }

    fn description(&self) -> &'static str {
        "Describe what is currently happening at a location (e.g. \"a storm rages \
         outside\"). Replaces the previous situation."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("locationId", "ID of the location")
            .required("situation", "What is happening there now")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let location_id = args::text(args, "locationId");
        let situation = args::text_any(args, &["situation", "currentSituation", "state"]);
        let (Some(location_id), Some(situation)) = (location_id, situation) else {
            return Ok(ToolOutcome::rejected(state, "Location ID and situation are required"));
        };

        let index = WorldIndex::new(state);
        let Some(slot) = index.slot(&location_id).filter(|s| s.kind == EntityKind::Location)
        else {
            return Ok(ToolOutcome::rejected(state, format!("Location not found: {location_id}")));
        };
        let location = state
            .location_at(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{location_id} missing")))?;
        if location.current_situation == situation {
            return Ok(ToolOutcome::unchanged(
                state,
                format!("{}'s situation is already \"{situation}\"", location.name),
            ));
        }
        let message = format!("{}: {situation}", location.name);

        let mut next = state.clone();
        next.location_at_mut(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{location_id} missing from clone")))?
            .current_situation = situation;
        Ok(ToolOutcome::applied(next, message))
    }
}
