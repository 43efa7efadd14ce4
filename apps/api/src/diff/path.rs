//! Dotted/bracketed path access into a CV document.
//!
//! Paths look like `summary.description` or `experience[0].responsibilities`.
//! Reads never fail: a missing segment yields `None`. Writes create missing
//! intermediate containers, choosing `[]` when the next segment is numeric
//! and `{}` otherwise, so a patch can target a path the source document
//! never populated.

use serde_json::{Map, Value};

/// Splits a path on `.`, `[` and `]`, dropping empty segments.
fn split_path(path: &str) -> Vec<&str> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Returns the value at `path`, or `None` if any segment is missing.
pub fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in split_path(path) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Sets `value` at `path`, mutating `root` in place.
///
/// Missing intermediates are created; arrays are padded with `null` up to the
/// target index. A segment that cannot be descended (e.g. a name segment into
/// a scalar) makes the whole write a no-op rather than an error.
pub fn set_value_at_path(root: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        return;
    }
    let segments = split_path(path);
    let Some((last, intermediate)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for (i, segment) in intermediate.iter().enumerate() {
        let next_is_index = segments[i + 1].parse::<usize>().is_ok();
        match descend_or_create(current, segment, next_is_index) {
            Some(next) => current = next,
            None => return,
        }
    }

    match current {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
        }
        Value::Array(items) => {
            if let Ok(index) = last.parse::<usize>() {
                if index >= items.len() {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
        }
        _ => {}
    }
}

fn empty_container(next_is_index: bool) -> Value {
    if next_is_index {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn descend_or_create<'a>(
    current: &'a mut Value,
    segment: &str,
    next_is_index: bool,
) -> Option<&'a mut Value> {
    match current {
        Value::Object(map) => {
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| empty_container(next_is_index));
            if slot.is_null() {
                *slot = empty_container(next_is_index);
            }
            Some(slot)
        }
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            if items[index].is_null() {
                items[index] = empty_container(next_is_index);
            }
            Some(&mut items[index])
        }
        _ => None,
    }
}
