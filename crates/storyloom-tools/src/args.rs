//! Lenient argument extraction.
//!
//! Reasoning engines are loose with types: ids arrive as numbers, values as
//! booleans, fields padded with whitespace. A field counts as present when it
//! is a non-blank string, a number, or a boolean.

use serde_json::Value;
use storyloom_types::ToolArgs;

/// Text value of `key`, trimmed. `None` if missing, null, blank, or a
/// structured value.
pub fn text(args: &ToolArgs, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First present key among `keys`, for fields with historical aliases.
pub fn text_any(args: &ToolArgs, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(args, key))
}

/// Text values of every key in `keys`, or `None` if any is absent.
pub fn require<const N: usize>(args: &ToolArgs, keys: [&str; N]) -> Option<[String; N]> {
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, key) in values.iter_mut().zip(keys) {
        *slot = text(args, key)?;
    }
    Some(values)
}
