//! The canonical tool set.
//!
//! Each tool follows the same shape: extract arguments, resolve ids through a
//! [`WorldIndex`], run its structural check, and only then clone and mutate.
//! Every early return hands back the caller's state untouched.
//!
//! [`WorldIndex`]: storyloom_world::WorldIndex

mod attributes;
mod create_object;
mod delete_object;
mod find_entity_location;
mod legacy_state;
mod move_object;
mod move_player;

use std::sync::Arc;

use storyloom_types::EntityId;
use storyloom_world::WorldIndex;

use crate::registry::Tool;

pub use attributes::{DeleteAttribute, STRUCTURAL_KEYS, SetAttribute, is_structural_key};
pub use create_object::{CreateObject, DEFAULT_CONDITION, parse_attribute_input};
pub use delete_object::DeleteObject;
pub use find_entity_location::FindEntityLocation;
pub use legacy_state::{ChangeLocationState, ChangeObjectState, ChangePlayerState};
pub use move_object::MoveObject;
pub use move_player::MovePlayer;

/// Every canonical tool, in registration order.
pub fn canonical() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(MoveObject),
        Arc::new(MovePlayer),
        Arc::new(CreateObject),
        Arc::new(DeleteObject),
        Arc::new(SetAttribute),
        Arc::new(DeleteAttribute),
        Arc::new(ChangePlayerState),
        Arc::new(ChangeObjectState),
        Arc::new(ChangeLocationState),
        Arc::new(FindEntityLocation),
    ]
}

/// Render ids as display names joined with arrows.
fn render_path(index: &WorldIndex<'_>, ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| index.display_name(id.as_str()))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
#[allow(missing_docs)]
pub(crate) mod fixtures {
    //! Shared world for tool tests.
    //!
    //! ```text
    //! Office (loc_001) <-> Hallway (loc_002)     Office -> Street (out)
    //! Basement (loc_004) declares Office as `in`
    //!
    //! Office
    //! ├── Alice (char_001)
    //! │   └── Satchel (obj_bag)
    //! └── Desk (obj_desk)
    //!     └── Drawer (obj_drawer)
    //!         └── Brass Key (obj_key)
    //! Hallway
    //! └── Wardrobe (obj_wardrobe)
    //!     └── Bob (char_002)
    //! ```

    use serde_json::Value;
    use storyloom_types::{Direction, Entity, GameState, Location, ToolArgs, World};

    pub fn world() -> GameState {
        GameState {
            world: World {
                genre: "mystery".to_owned(),
                description: "A quiet detective agency".to_owned(),
            },
            locations: vec![
                Location::new("loc_001", "Office")
                    .connected_to("loc_002", Direction::Bidirectional)
                    .connected_to("loc_003", Direction::Out),
                Location::new("loc_002", "Hallway"),
                Location::new("loc_003", "Street"),
                Location::new("loc_004", "Basement").connected_to("loc_001", Direction::In),
            ],
            players: vec![
                Entity::new("char_001", "Alice").inside("loc_001"),
                Entity::new("char_002", "Bob").inside("obj_wardrobe"),
            ],
            objects: vec![
                Entity::new("obj_bag", "Satchel").inside("char_001"),
                Entity::new("obj_desk", "Desk").inside("loc_001"),
                Entity::new("obj_drawer", "Drawer").inside("obj_desk"),
                Entity::new("obj_key", "Brass Key")
                    .inside("obj_drawer")
                    .with_attribute("condition", "tarnished"),
                Entity::new("obj_wardrobe", "Wardrobe").inside("loc_002"),
            ],
        }
    }

    pub fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    pub fn parent_of<'a>(state: &'a GameState, id: &str) -> Option<&'a str> {
        state
            .player(id)
            .or_else(|| state.object(id))
            .and_then(|e| e.connection_id.as_ref())
            .map(storyloom_types::EntityId::as_str)
    }
}
