//! Order-independent diff over flat collections (skills, tools, languages,
//! methodologies, extras).
//!
//! Items are raw strings or objects carrying a `name`/`label`/`title`/`value`
//! field; identity is the lowercased, trimmed name. Equal multisets produce
//! no records regardless of order: ordering in these collections carries no
//! meaning. A renamed item shows up as `removed` + `added`, never `modified`;
//! that asymmetry is intentional and preserved.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::change::{ChangeKind, ChangeRecord};

const NAME_FIELDS: [&str; 4] = ["name", "label", "title", "value"];

/// Lowercased, trimmed identity key for a collection item. Empty when the
/// item carries no usable name; such items are ignored by the differ.
pub fn item_key(item: &Value) -> String {
    match item {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Object(map) => NAME_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .unwrap_or("")
            .trim()
            .to_lowercase(),
        _ => String::new(),
    }
}

/// Human-facing name for a collection item, original casing preserved.
pub fn display_name(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => NAME_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}

/// Normalizes a proficiency/level value onto the 1..=4 scale.
/// Accepts numbers, numeric strings, and the usual level words.
pub fn normalize_level(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if let Ok(n) = s.parse::<i64>() {
                return Some(n);
            }
            match s.as_str() {
                "beginner" | "novice" | "basic" => Some(1),
                "intermediate" => Some(2),
                "advanced" | "proficient" => Some(3),
                "expert" | "master" | "fluent" => Some(4),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Reverse of `normalize_level`, for display.
pub fn level_key(level: i64) -> Option<&'static str> {
    match level {
        1 => Some("beginner"),
        2 => Some("intermediate"),
        3 => Some("advanced"),
        4 => Some("expert"),
        _ => None,
    }
}

fn proficiency(item: &Value) -> Option<i64> {
    let raw = item.get("proficiency").or_else(|| item.get("level"))?;
    normalize_level(raw)
}

fn level_label(level: i64) -> String {
    level_key(level)
        .map(str::to_string)
        .unwrap_or_else(|| level.to_string())
}

/// Partitions `current` vs `previous` into `added`/`removed` records by
/// identity key, plus `level_adjusted` for surviving items whose proficiency
/// moved.
pub fn diff_collection(
    current: &[Value],
    previous: &[Value],
    section: &str,
    field: &str,
    base_path: &str,
) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    let previous_by_key: HashMap<String, &Value> = previous
        .iter()
        .map(|item| (item_key(item), item))
        .filter(|(key, _)| !key.is_empty())
        .collect();
    let current_by_key: HashMap<String, &Value> = current
        .iter()
        .map(|item| (item_key(item), item))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    for item in current {
        let key = item_key(item);
        if key.is_empty() || previous_by_key.contains_key(&key) {
            continue;
        }
        let name = display_name(item);
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            change_type: ChangeKind::Added,
            item_name: Some(name.clone()),
            item_value: Some(item.clone()),
            after_value: Some(match item {
                Value::String(_) => item.clone(),
                _ => Value::String(name.clone()),
            }),
            change: format!("{name} added"),
            reason: "Relevant to the target role".to_string(),
            ..Default::default()
        });
    }

    for item in previous {
        let key = item_key(item);
        if key.is_empty() || current_by_key.contains_key(&key) {
            continue;
        }
        let name = display_name(item);
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            change_type: ChangeKind::Removed,
            item_name: Some(name.clone()),
            item_value: Some(item.clone()),
            before_value: Some(match item {
                Value::String(_) => item.clone(),
                _ => Value::String(name.clone()),
            }),
            change: format!("\"{name}\" removed"),
            reason: "Not relevant to the target role".to_string(),
            ..Default::default()
        });
    }

    for item in current {
        let key = item_key(item);
        let Some(&previous_item) = previous_by_key.get(&key).filter(|_| !key.is_empty()) else {
            continue;
        };
        let (Some(current_level), Some(previous_level)) =
            (proficiency(item), proficiency(previous_item))
        else {
            continue;
        };
        if current_level == previous_level {
            continue;
        }
        let name = display_name(item);
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            change_type: ChangeKind::LevelAdjusted,
            item_name: Some(name.clone()),
            item_value: Some(item.clone()),
            before_value: Some(Value::from(previous_level)),
            after_value: Some(Value::from(current_level)),
            change: format!(
                "{name}: {} → {}",
                level_label(previous_level),
                level_label(current_level)
            ),
            reason: "Level adjusted to match experience".to_string(),
            ..Default::default()
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(changes: &[ChangeRecord]) -> Vec<ChangeKind> {
        changes.iter().map(|c| c.change_type).collect()
    }

    #[test]
    fn test_permutation_yields_no_records() {
        let current = vec![json!("Python"), json!("SQL")];
        let previous = vec![json!("SQL"), json!("Python")];
        let changes = diff_collection(&current, &previous, "skills", "tools", "skills.tools");
        assert!(changes.is_empty(), "permuted collections must diff clean");
    }

    #[test]
    fn test_added_and_removed_partition() {
        let current = vec![json!("Rust"), json!("SQL")];
        let previous = vec![json!("SQL"), json!("Perl")];
        let changes = diff_collection(&current, &previous, "skills", "tools", "skills.tools");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].change_type, ChangeKind::Added);
        assert_eq!(changes[0].item_name.as_deref(), Some("Rust"));
        assert_eq!(changes[1].change_type, ChangeKind::Removed);
        assert_eq!(changes[1].item_name.as_deref(), Some("Perl"));
    }

    #[test]
    fn test_renamed_item_is_removed_plus_added() {
        // A rename is observed as removed + added, never modified.
        let current = vec![json!({"name": "PostgreSQL"})];
        let previous = vec![json!({"name": "Postgres"})];
        let changes = diff_collection(&current, &previous, "skills", "tools", "skills.tools");
        assert_eq!(
            kinds(&changes),
            vec![ChangeKind::Added, ChangeKind::Removed]
        );
    }

    #[test]
    fn test_identity_is_case_and_whitespace_insensitive() {
        let current = vec![json!("  rust ")];
        let previous = vec![json!("Rust")];
        let changes = diff_collection(&current, &previous, "skills", "tools", "skills.tools");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_object_items_keyed_by_name_fallbacks() {
        let current = vec![json!({"label": "Agile"})];
        let previous = vec![json!({"title": "Agile"})];
        let changes = diff_collection(
            &current,
            &previous,
            "skills",
            "methodologies",
            "skills.methodologies",
        );
        assert!(changes.is_empty(), "label and title are the same identity");
    }

    #[test]
    fn test_items_without_identity_ignored() {
        let current = vec![json!({"irrelevant": true}), json!(42)];
        let previous = vec![];
        let changes = diff_collection(&current, &previous, "skills", "tools", "skills.tools");
        assert!(changes.is_empty());
    }

    #[test]
    fn test_level_adjusted_on_proficiency_change() {
        let current = vec![json!({"name": "Rust", "proficiency": "expert"})];
        let previous = vec![json!({"name": "Rust", "proficiency": "intermediate"})];
        let changes = diff_collection(
            &current,
            &previous,
            "skills",
            "hard_skills",
            "skills.hard_skills",
        );
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.change_type, ChangeKind::LevelAdjusted);
        assert_eq!(change.before_value, Some(json!(2)));
        assert_eq!(change.after_value, Some(json!(4)));
        assert!(change.change.contains("intermediate → expert"));
    }

    #[test]
    fn test_level_unchanged_emits_nothing() {
        let current = vec![json!({"name": "Rust", "level": 3})];
        let previous = vec![json!({"name": "Rust", "proficiency": "advanced"})];
        let changes = diff_collection(
            &current,
            &previous,
            "skills",
            "hard_skills",
            "skills.hard_skills",
        );
        assert!(changes.is_empty(), "3 and advanced normalize equal");
    }
}
