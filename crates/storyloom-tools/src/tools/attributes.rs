//! `set_attribute` and `delete_attribute`.
//!
//! Attributes are free-form prose. Keys naming identity or containment
//! ([`STRUCTURAL_KEYS`]) are refused; containment only changes through the
//! movement tools.

use storyloom_types::{Attributes, GameState, Slot, ToolArgs};
use storyloom_world::WorldIndex;

use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Keys that cannot be written through the attribute tools.
pub const STRUCTURAL_KEYS: [&str; 5] =
    ["id", "connectionId", "connection_id", "locationId", "location_id"];

/// Whether `key` names identity or containment, ignoring case.
pub fn is_structural_key(key: &str) -> bool {
    STRUCTURAL_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key.trim()))
}

fn structural_refusal(key: &str) -> String {
    format!(
        "'{key}' is structural and cannot be changed as an attribute; \
         use move_object or move_player to change where something is"
    )
}

/// Resolve the target of an attribute call.
fn resolve<'a>(
    index: &WorldIndex<'a>,
    entity_id: &str,
) -> Result<(Slot, &'a Attributes), String> {
    let slot = index.slot(entity_id).ok_or_else(|| format!("Entity not found: {entity_id}"))?;
    let attributes = index
        .state()
        .attributes_at(slot)
        .ok_or_else(|| format!("Entity not found: {entity_id}"))?;
    Ok((slot, attributes))
}

const ENTITY_KEYS: [&str; 4] = ["entityId", "objectId", "playerId", "targetId"];

/// Set one narrative attribute on any entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetAttribute;

impl Tool for SetAttribute {
    fn name(&self) -> &'static str {
        "set_attribute"
    }

    fn description(&self) -> &'static str {
        "Set a descriptive attribute on a location, player, or object, such as \
         condition, mood, or temperature. Values are prose (\"slightly rusty\", \"asleep\"), \
         not numbers. Cannot change ids or containment; use the move tools for that."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("entityId", "ID of the location, player, or object")
            .required("key", "Attribute name, e.g. condition")
            .required("value", "New prose value")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let entity_id = args::text_any(args, &ENTITY_KEYS);
        let key = args::text(args, "key");
        let value = args::text(args, "value");
        let (Some(entity_id), Some(key), Some(value)) = (entity_id, key, value) else {
            return Ok(ToolOutcome::rejected(state, "Entity ID, key, and value are required"));
        };
        if is_structural_key(&key) {
            return Ok(ToolOutcome::rejected(state, structural_refusal(&key)));
        }

        let index = WorldIndex::new(state);
        let (slot, attributes) = match resolve(&index, &entity_id) {
            Ok(found) => found,
            Err(message) => return Ok(ToolOutcome::rejected(state, message)),
        };
        let name = index.display_name(&entity_id);

        let message = match attributes.get(&key) {
            Some(old) if *old == value => {
                return Ok(ToolOutcome::unchanged(
                    state,
                    format!("{name}'s {key} is already \"{value}\""),
                ));
            }
            Some(old) => format!("Changed {name}'s {key} from \"{old}\" to \"{value}\""),
            None => format!("Set {name}'s {key} to \"{value}\""),
        };

        let mut next = state.clone();
        next.attributes_at_mut(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{entity_id} missing from clone")))?
            .insert(key, value);
        Ok(ToolOutcome::applied(next, message))
    }
}

/// Remove one narrative attribute from any entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteAttribute;

impl Tool for DeleteAttribute {
    fn name(&self) -> &'static str {
        "delete_attribute"
    }

    fn description(&self) -> &'static str {
        "Remove a descriptive attribute from a location, player, or object when it no \
         longer applies (a wound heals, a stain is cleaned)."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("entityId", "ID of the location, player, or object")
            .required("key", "Attribute name to remove")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let entity_id = args::text_any(args, &ENTITY_KEYS);
        let key = args::text(args, "key");
        let (Some(entity_id), Some(key)) = (entity_id, key) else {
            return Ok(ToolOutcome::rejected(state, "Entity ID and key are required"));
        };
        if is_structural_key(&key) {
            return Ok(ToolOutcome::rejected(state, structural_refusal(&key)));
        }

        let index = WorldIndex::new(state);
        let (slot, attributes) = match resolve(&index, &entity_id) {
            Ok(found) => found,
            Err(message) => return Ok(ToolOutcome::rejected(state, message)),
        };
        let name = index.display_name(&entity_id);

        if !attributes.contains_key(&key) {
            return Ok(ToolOutcome::rejected(state, format!("{name} has no attribute '{key}'")));
        }
        let message = format!("Removed {key} from {name}");

        let mut next = state.clone();
        next.attributes_at_mut(slot)
            .ok_or_else(|| ToolError::Inconsistent(format!("{entity_id} missing from clone")))?
            .remove(&key);
        Ok(ToolOutcome::applied(next, message))
    }
}
