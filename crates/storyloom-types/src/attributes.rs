//! Narrative attribute maps.
//!
//! Attribute values are always prose ("slightly rusty", "asleep"), never raw
//! numbers. Documents written by older editors sometimes omit the map, set it
//! to `null`, or store numbers and booleans; [`normalize_attributes`] folds
//! all of those into a plain string map so tools never see a missing or
//! mistyped map.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ordered string-to-string map of narrative attributes.
pub type Attributes = BTreeMap<String, String>;

/// Normalize an arbitrary JSON value into an attribute map.
///
/// - `null` becomes an empty map.
/// - An object keeps every key; string values are copied, `null` values are
///   dropped, and any other value is rendered as its JSON text.
/// - A string holding a JSON object is decoded and normalized recursively.
///
/// Returns `None` for values that cannot represent a map (arrays, numbers,
/// plain strings).
pub fn normalize_attributes(value: &Value) -> Option<Attributes> {
    match value {
        Value::Null => Some(Attributes::new()),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(k, v)| value_to_prose(v).map(|text| (k.clone(), text)))
                .collect(),
        ),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(decoded @ Value::Object(_)) => normalize_attributes(&decoded),
            _ => None,
        },
        _ => None,
    }
}

fn value_to_prose(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Serde `deserialize_with` hook that applies [`normalize_attributes`].
///
/// Unrepresentable values collapse to an empty map rather than failing the
/// whole document.
pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Attributes, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(normalize_attributes)
        .unwrap_or_default())
}
