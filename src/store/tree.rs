//! In-place edits of a JSON document tree.

use serde_json::{Map, Value};

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn as_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

pub fn get<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(*segment)?;
    }
    if is_empty(node) {
        None
    } else {
        Some(node)
    }
}

/// Store `value` at `segments`, creating intermediate objects. Storing
/// `null` or an empty object removes the node instead.
pub fn put(root: &mut Value, segments: &[&str], value: Value) {
    if is_empty(&value) {
        remove(root, segments);
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for segment in parents {
        node = as_object(node)
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    as_object(node).insert(last.to_string(), value);
}

/// Shallow merge of `partial` into the node at `segments` (see `RecordStore::upsert`).
pub fn merge(root: &mut Value, segments: &[&str], partial: Value) {
    let merged = match (get(root, segments), partial) {
        (Some(Value::Object(existing)), Value::Object(patch)) => {
            let mut merged = existing.clone();
            for (key, value) in patch {
                if value.is_null() {
                    merged.remove(&key);
                } else {
                    merged.insert(key, value);
                }
            }
            Value::Object(merged)
        }
        (_, Value::Object(patch)) => {
            Value::Object(patch.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        (_, other) => other,
    };
    put(root, segments, merged);
}

/// Remove the node at `segments`, pruning ancestors left empty.
/// Returns whether anything was removed.
pub fn remove(root: &mut Value, segments: &[&str]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        let existed = !root.is_null();
        *root = Value::Null;
        return existed;
    };
    let Value::Object(map) = root else {
        return false;
    };
    if rest.is_empty() {
        return map.remove(*head).is_some();
    }
    let Some(child) = map.get_mut(*head) else {
        return false;
    };
    let removed = remove(child, rest);
    if is_empty(child) {
        map.remove(*head);
    }
    removed
}
