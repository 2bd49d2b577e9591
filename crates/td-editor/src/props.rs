//! Dot-path access into a control's serialized form.
//!
//! Property-update commands address arbitrary nested fields — `"label"`,
//! `"style.backgroundColor"`, `"mapping.combo.hold"` — so edits operate on
//! the control's `serde_json::Value` image and deserialize back, keeping
//! the typed fields validated.

use serde_json::{Map, Value};

pub(crate) fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub(crate) fn get_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Set a nested value, creating (or overwriting non-object values with)
/// intermediate objects along the way.
pub(crate) fn set_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = root;
    for (i, segment) in segments.iter().enumerate() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if i == segments.len() - 1 {
            map.insert((*segment).to_string(), value);
            return;
        }
        current = map.entry((*segment).to_string()).or_insert(Value::Null);
    }
}

/// Remove the value at a nested path, if present.
pub(crate) fn remove_path(root: &mut Value, path: &str) {
    match path.rsplit_once('.') {
        None => {
            if let Some(map) = root.as_object_mut() {
                map.remove(path);
            }
        }
        Some((parent, last)) => {
            if let Some(parent) = get_path_mut(root, parent)
                && let Some(map) = parent.as_object_mut()
            {
                map.remove(last);
            }
        }
    }
}
