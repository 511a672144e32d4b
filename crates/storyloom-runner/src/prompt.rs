//! Prompt composition via `minijinja`.
//!
//! Three templates drive a turn: `system.j2` (behavioral rules plus the
//! world state), `state.j2` (the world state alone, re-sent after every tool
//! batch), and `narrate.j2` (the narrative-only instruction). Built-in
//! versions are compiled into the binary; a templates directory can override
//! them, in which case it must contain all three.

use std::collections::BTreeSet;

use minijinja::Environment;
use serde_json::json;
use storyloom_tools::ToolSchema;
use storyloom_types::{EntityKind, GameState};
use storyloom_world::{WorldIndex, direct_children, reachable_from, unrooted_entities};

use crate::config::TurnSettings;
use crate::error::RunnerError;

/// Template names, in load order.
const TEMPLATE_NAMES: [&str; 3] = ["system.j2", "state.j2", "narrate.j2"];

const BUILTIN: [(&str, &str); 3] = [
    ("system.j2", include_str!("../templates/system.j2")),
    ("state.j2", include_str!("../templates/state.j2")),
    ("narrate.j2", include_str!("../templates/narrate.j2")),
];

/// Renders the instructions sent to the reasoning engine.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Prompt engine over the built-in templates.
    pub fn builtin() -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN {
            env.add_template(name, source)
                .map_err(|e| RunnerError::Template(format!("failed to add {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Prompt engine loading every template from `templates_dir`.
    pub fn from_dir(templates_dir: &str) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        for name in TEMPLATE_NAMES {
            let source = load_template(templates_dir, name)?;
            env.add_template_owned(name, source)
                .map_err(|e| RunnerError::Template(format!("failed to add {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Built-in templates unless an override directory is given.
    pub fn load(templates_dir: Option<&str>) -> Result<Self, RunnerError> {
        templates_dir.map_or_else(Self::builtin, Self::from_dir)
    }

    /// The system instruction: rules, available tools, and the current state.
    pub fn system_instruction(
        &self,
        state: &GameState,
        settings: &TurnSettings,
        tools: &[ToolSchema],
    ) -> Result<String, RunnerError> {
        let genre = state.world.genre.trim();
        let ctx = json!({
            "genre": if genre.is_empty() { "adventure" } else { genre },
            "world_description": state.world.description,
            "language": settings.language,
            "tool_names": tools.iter().map(|t| t.name).collect::<Vec<_>>(),
            "outline": containment_outline(state),
            "state_json": serde_json::to_string_pretty(state)?,
        });
        self.render("system.j2", &ctx)
    }

    /// The current state alone, for feeding back after tool results.
    pub fn state_context(&self, state: &GameState) -> Result<String, RunnerError> {
        let ctx = json!({
            "outline": containment_outline(state),
            "state_json": serde_json::to_string_pretty(state)?,
        });
        self.render("state.j2", &ctx)
    }

    /// The narrative-only instruction.
    pub fn narrative_instruction(&self, settings: &TurnSettings) -> Result<String, RunnerError> {
        self.render("narrate.j2", &json!({"language": settings.language}))
    }

    fn render(&self, name: &str, ctx: &serde_json::Value) -> Result<String, RunnerError> {
        self.env
            .get_template(name)
            .map_err(|e| RunnerError::Template(format!("missing {name}: {e}")))?
            .render(ctx)
            .map(|text| text.trim().to_owned())
            .map_err(|e| RunnerError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, RunnerError> {
    let path = format!("{}/{filename}", dir.trim_end_matches('/'));
    std::fs::read_to_string(&path)
        .map_err(|e| RunnerError::Template(format!("failed to read {path}: {e}")))
}

/// Indented containment tree, one location per root, with exits.
///
/// ```text
/// - Office (loc_001) -- exits: Hallway
///   - Alice (char_001) [player]
///     - Satchel (obj_bag)
/// ```
pub fn containment_outline(state: &GameState) -> String {
    let index = WorldIndex::new(state);
    let mut lines = Vec::new();
    let mut visited = BTreeSet::new();

    for location in &state.locations {
        let exits: Vec<&str> =
            reachable_from(&index, location).into_iter().map(|l| l.name.as_str()).collect();
        let mut line = format!("- {} ({})", location.name, location.id);
        if !location.current_situation.is_empty() {
            line = format!("{line}: {}", location.current_situation);
        }
        if !exits.is_empty() {
            line = format!("{line} -- exits: {}", exits.join(", "));
        }
        lines.push(line);
        push_children(&index, location.id.as_str(), 1, &mut visited, &mut lines);
    }

    let unrooted = unrooted_entities(state);
    if !unrooted.is_empty() {
        lines.push("Not inside any location:".to_owned());
        for id in &unrooted {
            lines.push(format!("- {} ({id})", index.display_name(id.as_str())));
        }
    }
    lines.join("\n")
}

fn push_children(
    index: &WorldIndex<'_>,
    parent: &str,
    depth: usize,
    visited: &mut BTreeSet<String>,
    lines: &mut Vec<String>,
) {
    for slot in direct_children(index, parent) {
        let Some(entity) = index.state().entity_at(slot) else {
            continue;
        };
        if !visited.insert(entity.id.to_string()) {
            continue;
        }
        let indent = "  ".repeat(depth);
        let tag = if slot.kind == EntityKind::Player { " [player]" } else { "" };
        lines.push(format!("{indent}- {} ({}){tag}", entity.name, entity.id));
        push_children(index, entity.id.as_str(), depth.saturating_add(1), visited, lines);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storyloom_tools::ToolRegistry;
    use storyloom_types::{Direction, Entity, Location, World};

    use super::*;

    fn state() -> GameState {
        GameState {
            world: World { genre: "noir".to_owned(), description: "Rain, always rain.".to_owned() },
            locations: vec![
                Location::new("loc_001", "Office").connected_to("loc_002", Direction::Bidirectional),
                Location::new("loc_002", "Hallway"),
            ],
            players: vec![Entity::new("char_001", "Alice").inside("loc_001")],
            objects: vec![
                Entity::new("obj_bag", "Satchel").inside("char_001"),
                Entity::new("obj_note", "Note"),
            ],
        }
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let unique = format!(
            "storyloom_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        std::env::temp_dir().join(unique)
    }

    #[test]
    fn outline_nests_and_lists_loose_entities() {
        let outline = containment_outline(&state());
        assert_eq!(
            outline,
            "- Office (loc_001) -- exits: Hallway\n\
             \x20 - Alice (char_001) [player]\n\
             \x20   - Satchel (obj_bag)\n\
             - Hallway (loc_002) -- exits: Office\n\
             Not inside any location:\n\
             - Note (obj_note)"
        );
    }

    #[test]
    fn builtin_system_instruction_embeds_state_and_rules() {
        let engine = PromptEngine::builtin().unwrap();
        let settings = TurnSettings { language: "Deutsch".to_owned(), ..TurnSettings::default() };
        let tools = ToolRegistry::standard().schemas();

        let system = engine.system_instruction(&state(), &settings, &tools).unwrap_or_default();
        assert!(system.contains("noir"));
        assert!(system.contains("Rain, always rain."));
        assert!(system.contains("Write the story in Deutsch"));
        assert!(system.contains("move_object, move_player"));
        assert!(system.contains("- Alice (char_001) [player]"));
        assert!(system.contains("\"currentSituation\""));

        let narrate = engine.narrative_instruction(&settings).unwrap_or_default();
        assert!(narrate.contains("Deutsch"));
        assert!(narrate.contains("Do not call any tools"));

        let context = engine.state_context(&state()).unwrap_or_default();
        assert!(context.starts_with("## Current world state"));
    }

    #[test]
    fn override_directory_replaces_templates() {
        let dir = temp_dir("templates");
        std::fs::create_dir_all(&dir).ok();
        std::fs::write(dir.join("system.j2"), "Rules in {{ language }}. {% include \"state.j2\" %}").ok();
        std::fs::write(dir.join("state.j2"), "STATE").ok();
        std::fs::write(dir.join("narrate.j2"), "Narrate in {{ language }}.").ok();

        let engine = PromptEngine::load(dir.to_str());
        assert!(engine.is_ok());
        if let Ok(engine) = engine {
            let system = engine
                .system_instruction(&state(), &TurnSettings::default(), &[])
                .unwrap_or_default();
            assert_eq!(system, "Rules in English. STATE");
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_override_template_returns_error() {
        let dir = temp_dir("missing_templates");
        std::fs::create_dir_all(&dir).ok();
        std::fs::write(dir.join("system.j2"), "test").ok();

        let result = PromptEngine::from_dir(dir.to_str().unwrap_or(""));
        assert!(matches!(result, Err(RunnerError::Template(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
