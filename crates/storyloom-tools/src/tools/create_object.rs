//! `create_object`: spawn a new object under an existing parent.

use serde_json::Value;
use storyloom_types::{Attributes, Entity, GameState, ToolArgs, normalize_attributes};
use storyloom_world::WorldIndex;

use crate::args;
use crate::error::ToolError;
use crate::id_alloc::allocate_object_id;
use crate::outcome::ToolOutcome;
use crate::registry::Tool;
use crate::schema::ParameterSchema;

/// Condition given to objects created without attributes.
pub const DEFAULT_CONDITION: &str = "in good condition";

/// Create an object inside a location, player, or object.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateObject;

impl Tool for CreateObject {
    fn name(&self) -> &'static str {
        "create_object"
    }

    fn description(&self) -> &'static str {
        "Create a new object inside a location, a player's inventory, or another object. \
         Use this when something new appears in the story: an item is found, crafted, \
         or conjured. Attributes describe the object in prose, e.g. {\"condition\": \"freshly baked\"}."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::object()
            .required("name", "Display name of the new object")
            .required("connectionId", "ID of the location, player, or object that will contain it")
            .optional("description", "string", "Prose description of the object")
            .optional("attributes", "object", "Narrative attributes as prose strings")
    }

    fn apply<'a>(
        &self,
        state: &'a GameState,
        args: &ToolArgs,
    ) -> Result<ToolOutcome<'a>, ToolError> {
        let name = args::text(args, "name");
        let parent_id = args::text_any(args, &["connectionId", "parentId", "locationId", "targetId"]);
        let (Some(name), Some(parent_id)) = (name, parent_id) else {
            return Ok(ToolOutcome::rejected(state, "Object name and parent ID are required"));
        };

        let index = WorldIndex::new(state);
        if !index.contains(&parent_id) {
            return Ok(ToolOutcome::rejected(state, format!("Parent not found: {parent_id}")));
        }
        let parent_name = index.display_name(&parent_id);

        let id = allocate_object_id(state)?;
        let message = format!("Created {name} ({id}) in {parent_name}");

        let mut object = Entity::new(id.clone(), name).inside(parent_id.as_str());
        object.description = args::text(args, "description");
        object.attributes = parse_attribute_input(args.get("attributes"));

        let mut next = state.clone();
        next.objects.push(object);
        Ok(ToolOutcome::applied(next, message).with_created(id))
    }
}

/// Interpret whatever the reasoning engine sent as `attributes`.
///
/// Objects and JSON-encoded objects are normalized; a bare string, number,
/// or boolean becomes the `condition`. An empty result gets
/// [`DEFAULT_CONDITION`].
pub fn parse_attribute_input(raw: Option<&Value>) -> Attributes {
    let mut attributes = match raw {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            match normalize_attributes(&Value::String(trimmed.to_owned())) {
                Some(map) => map,
                None if trimmed.is_empty() => Attributes::new(),
                None => Attributes::from([("condition".to_owned(), trimmed.to_owned())]),
            }
        }
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
            Attributes::from([("condition".to_owned(), scalar.to_string())])
        }
        Some(other) => normalize_attributes(other).unwrap_or_default(),
        None => Attributes::new(),
    };
    if attributes.is_empty() {
        attributes.insert("condition".to_owned(), DEFAULT_CONDITION.to_owned());
    }
    attributes
}
