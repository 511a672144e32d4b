//! `delete_object`: remove an object, rescuing its contents.

use storyloom_types::{EntityKind, GameState, ToolArgs};
use storyloom_world::{WorldIndex, direct_children, reparent_target};

use crate::args;
use crate::error::ToolError;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Delete an object. Its direct children move up to the object's parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteObject;

impl Tool for DeleteObject {
    fn name(&self) -> &'static str {
        "delete_object"
    }

    fn description(&self) -> &'static str {
        "Remove an object from the world when it is consumed, destroyed, or otherwise gone. \
         Anything inside it is moved to where the object was. Players and locations cannot \
         be deleted."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object().required("objectId", "ID of the object to delete")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let Some(object_id) = args::text_any(args, &["objectId", "entityId"]) else {
            return Ok(ToolOutcome::rejected(state, "Object ID is required"));
        };

        let index = WorldIndex::new(state);
        let Some(slot) = index.slot(&object_id) else {
            return Ok(ToolOutcome::rejected(state, format!("Object not found: {object_id}")));
        };
        let name = index.display_name(&object_id);
        if slot.kind != EntityKind::Object {
            return Ok(ToolOutcome::rejected(
                state,
                format!(
                    "Only objects can be deleted; {name} is a {}",
                    slot.kind.label().to_ascii_lowercase()
                ),
            ));
        }

        let new_parent = reparent_target(&index, &object_id);
        let children: Vec<_> = direct_children(&index, &object_id)
            .into_iter()
            .filter(|child| *child != slot)
            .collect();

        let mut message = format!("Deleted {name}");
        if !children.is_empty() {
            let names: Vec<&str> =
                children.iter().filter_map(|child| state.name_at(*child)).collect();
            let destination = new_parent
                .as_ref()
                .map_or("nowhere (now unparented)", |p| index.display_name(p.as_str()));
            message = format!(
                "{message}; moved {} item(s) ({}) to {destination}",
                children.len(),
                names.join(", ")
            );
        }

        let mut next = state.clone();
        for child in &children {
            let entity = next.entity_at_mut(*child).ok_or_else(|| {
                ToolError::Inconsistent(format!("child of {object_id} missing from clone"))
            })?;
            entity.connection_id.clone_from(&new_parent);
        }
        if slot.position >= next.objects.len() {
            return Err(ToolError::Inconsistent(format!("{object_id} missing from clone")));
        }
        next.objects.remove(slot.position);

        Ok(ToolOutcome::applied(next, message))
    }
}
