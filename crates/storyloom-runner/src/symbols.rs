//! Per-turn symbol table for forward references between tool calls.
//!
//! A reasoning engine that creates an object and then wants to use it in the
//! same batch cannot know the new id yet. It writes `$N` instead, where `N`
//! is the zero-based index of the creating call within the turn. Before each
//! dispatch, string arguments of exactly that form are replaced with the
//! recorded id. Unknown references are left alone so the tool reports them.

use std::collections::BTreeMap;

use serde_json::Value;
use storyloom_types::{EntityId, ToolArgs};

/// Created ids keyed by call index within a turn.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    created: BTreeMap<usize, EntityId>,
}

impl SymbolTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that call `index` created `id`.
    pub fn record(&mut self, index: usize, id: EntityId) {
        self.created.insert(index, id);
    }

    /// The id referenced by `reference`, if it is a known `$N`.
    pub fn lookup(&self, reference: &str) -> Option<&EntityId> {
        let index = reference.trim().strip_prefix('$')?.parse::<usize>().ok()?;
        self.created.get(&index)
    }

    /// Copy of `args` with every known `$N` string replaced, at any depth.
    pub fn resolve(&self, args: &ToolArgs) -> ToolArgs {
        args.iter().map(|(key, value)| (key.clone(), self.resolve_value(value))).collect()
    }

    fn resolve_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => self
                .lookup(text)
                .map_or_else(|| value.clone(), |id| Value::String(id.to_string())),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.resolve_value(v)).collect()),
            Value::Object(map) => Value::Object(self.resolve(map)),
            _ => value.clone(),
        }
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_exact_references_only() {
        let mut table = SymbolTable::new();
        table.record(0, EntityId::new("obj_1_abcd"));

        let args = json!({
            "objectId": "$0",
            "targetId": "$1",
            "note": "costs $0 today",
            "nested": {"ids": ["$0", 3]}
        });
        let resolved = table.resolve(args.as_object().unwrap_or(&ToolArgs::new()));

        assert_eq!(resolved.get("objectId"), Some(&json!("obj_1_abcd")));
        assert_eq!(resolved.get("targetId"), Some(&json!("$1")));
        assert_eq!(resolved.get("note"), Some(&json!("costs $0 today")));
        assert_eq!(resolved.get("nested"), Some(&json!({"ids": ["obj_1_abcd", 3]})));
    }

    #[test]
    fn lookup_rejects_malformed_references() {
        let mut table = SymbolTable::new();
        table.record(2, EntityId::new("obj_x"));
        assert_eq!(table.lookup("$2").map(EntityId::as_str), Some("obj_x"));
        assert_eq!(table.lookup("$"), None);
        assert_eq!(table.lookup("$-1"), None);
        assert_eq!(table.lookup("2"), None);
        assert!(!table.is_empty());
    }
}
