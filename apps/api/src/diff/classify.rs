//! Change classification: turns raw differ output (or a generation service's
//! self-reported change list) into the uniform, reviewable `ChangeRecord`
//! form with stable ids and human-readable before/after display strings.

use serde_json::Value;
use uuid::Uuid;

use crate::diff::document::compute_document_diff;
use crate::diff::path::value_at_path;
use crate::models::change::{ChangeKind, ChangeRecord};

/// Unique-per-session change id, `change_` plus 8 hex characters.
pub fn generate_change_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("change_{}", &id[..8])
}

/// Renders a value for side-by-side display: arrays of named objects become
/// a comma-joined name list, plain arrays join their items, objects
/// pretty-print, null renders empty.
pub fn format_value_for_display(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let all_named = !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.get("name").and_then(Value::as_str).is_some());
            if all_named {
                items
                    .iter()
                    .filter_map(|item| item.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
        Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
        other => other.to_string(),
    }
}

fn exp_label(value: Option<&Value>) -> String {
    value
        .and_then(|v| v.get("title"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled")
        .to_string()
}

/// Finalizes a change list against the two documents: assigns missing ids,
/// fills `path` from `section`/`field`, pulls before/after values from the
/// documents when the record omitted them, and renders display strings.
pub fn compute_detailed_changes(
    current: &Value,
    previous: &Value,
    changes: Vec<ChangeRecord>,
) -> Vec<ChangeRecord> {
    changes
        .into_iter()
        .map(|mut change| {
            if change.id.is_empty() {
                change.id = generate_change_id();
            }
            if change.path.is_empty() {
                change.path = format!("{}.{}", change.section, change.field);
            }
            change.reviewed_at = None;

            match change.change_type {
                ChangeKind::ExperienceRemoved => {
                    let title = exp_label(change.before_value.as_ref());
                    let company = change
                        .before_value
                        .as_ref()
                        .and_then(|v| v.get("company"))
                        .and_then(Value::as_str)
                        .filter(|c| !c.is_empty())
                        .unwrap_or("N/A")
                        .to_string();
                    change.after_value = None;
                    change.before_display = format!("{title} ({company})");
                    change.after_display = String::new();
                    if change.change.is_empty() {
                        change.change = format!("Experience \"{title}\" removed");
                    }
                    if change.reason.is_empty() {
                        change.reason = "Not relevant to the target role".to_string();
                    }
                }
                ChangeKind::MoveToProjects => {
                    let title = exp_label(change.before_value.as_ref());
                    let project_name = change
                        .project_data
                        .as_ref()
                        .and_then(|p| p.get("name"))
                        .and_then(Value::as_str)
                        .filter(|n| !n.is_empty())
                        .unwrap_or(&title)
                        .to_string();
                    change.after_value = None;
                    change.before_display = format!("Experience: {title}");
                    change.after_display = format!("Project: {project_name}");
                    if change.change.is_empty() {
                        change.change = format!("Experience \"{title}\" moved to Projects");
                    }
                    if change.reason.is_empty() {
                        change.reason = "Reads better as a project for the target role".to_string();
                    }
                }
                _ => {
                    // Backfill from the documents only for field-scoped
                    // records. Item-scoped ones (a single skill, bullet,
                    // language) must keep their one-item values: filling in
                    // the whole array at the path would make their rollback
                    // revert neighbours too.
                    let item_scoped = change.item_name.is_some() || change.item_value.is_some();
                    if !item_scoped {
                        if change.before_value.is_none() {
                            change.before_value = value_at_path(previous, &change.path).cloned();
                        }
                        if change.after_value.is_none() {
                            change.after_value = value_at_path(current, &change.path).cloned();
                        }
                    }
                    if change.before_display.is_empty() {
                        change.before_display =
                            format_value_for_display(change.before_value.as_ref());
                    }
                    if change.after_display.is_empty() {
                        change.after_display = format_value_for_display(change.after_value.as_ref());
                    }
                }
            }
            change
        })
        .collect()
}

/// The diff operation: structural diff of `current` against `previous`,
/// classified and ready for review.
///
/// The differ's own output is authoritative because it is verifiable against
/// the documents. A self-reported `raw_changes` list contributes only its
/// `multi_renamed` records (which the differ cannot produce) as opaque
/// pass-through, and is used wholesale only when the differ finds nothing.
pub fn diff_documents(
    current: &Value,
    previous: &Value,
    raw_changes: Option<Vec<ChangeRecord>>,
) -> Vec<ChangeRecord> {
    let mut computed = compute_document_diff(current, previous);

    match raw_changes {
        Some(raw) if computed.is_empty() && !raw.is_empty() => {
            computed = raw;
        }
        Some(raw) => {
            computed.extend(
                raw.into_iter()
                    .filter(|c| c.change_type == ChangeKind::MultiRenamed),
            );
        }
        None => {}
    }

    compute_detailed_changes(current, previous, computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::ChangeStatus;
    use serde_json::json;

    #[test]
    fn test_generated_ids_have_stable_shape() {
        let id = generate_change_id();
        assert!(id.starts_with("change_"));
        assert_eq!(id.len(), "change_".len() + 8);
        assert_ne!(generate_change_id(), generate_change_id());
    }

    #[test]
    fn test_display_joins_named_arrays() {
        let value = json!([{"name": "Rust"}, {"name": "SQL"}]);
        assert_eq!(format_value_for_display(Some(&value)), "Rust, SQL");
    }

    #[test]
    fn test_display_joins_string_arrays() {
        let value = json!(["a", "b"]);
        assert_eq!(format_value_for_display(Some(&value)), "a, b");
    }

    #[test]
    fn test_display_pretty_prints_objects() {
        let value = json!({"degree": "BSc"});
        let rendered = format_value_for_display(Some(&value));
        assert!(rendered.contains("\"degree\""));
        assert!(rendered.contains('\n'), "objects pretty-print");
    }

    #[test]
    fn test_display_empty_for_null_and_missing() {
        assert_eq!(format_value_for_display(None), "");
        assert_eq!(format_value_for_display(Some(&Value::Null)), "");
    }

    #[test]
    fn test_detailing_fills_id_path_and_values_from_documents() {
        let previous = json!({"summary": {"description": "Old"}});
        let current = json!({"summary": {"description": "New"}});
        let raw = vec![ChangeRecord {
            section: "summary".to_string(),
            field: "description".to_string(),
            ..Default::default()
        }];
        let detailed = compute_detailed_changes(&current, &previous, raw);
        let change = &detailed[0];
        assert!(change.id.starts_with("change_"));
        assert_eq!(change.path, "summary.description");
        assert_eq!(change.before_value, Some(json!("Old")));
        assert_eq!(change.after_value, Some(json!("New")));
        assert_eq!(change.before_display, "Old");
        assert_eq!(change.after_display, "New");
        assert_eq!(change.status, ChangeStatus::Pending);
    }

    #[test]
    fn test_item_scoped_records_are_not_backfilled_with_whole_arrays() {
        let previous = json!({"skills": {"tools": ["Git", "Jenkins"]}});
        let current = json!({"skills": {"tools": ["Git", "Jenkins", "Docker"]}});
        let raw = vec![ChangeRecord {
            section: "skills".to_string(),
            field: "tools".to_string(),
            path: "skills.tools".to_string(),
            change_type: ChangeKind::Added,
            item_name: Some("Docker".to_string()),
            item_value: Some(json!("Docker")),
            after_value: Some(json!("Docker")),
            ..Default::default()
        }];
        let detailed = compute_detailed_changes(&current, &previous, raw);
        assert!(
            detailed[0].before_value.is_none(),
            "an added item must not inherit the whole previous array"
        );
        assert_eq!(detailed[0].after_display, "Docker");
    }

    #[test]
    fn test_experience_removed_display() {
        let raw = vec![ChangeRecord {
            section: "experience".to_string(),
            field: "experience[0]".to_string(),
            path: "experience[0]".to_string(),
            change_type: ChangeKind::ExperienceRemoved,
            before_value: Some(json!({"title": "Dev", "company": "Acme"})),
            ..Default::default()
        }];
        let detailed = compute_detailed_changes(&json!({}), &json!({}), raw);
        assert_eq!(detailed[0].before_display, "Dev (Acme)");
        assert_eq!(detailed[0].after_display, "");
        assert!(detailed[0].after_value.is_none());
    }

    #[test]
    fn test_move_to_projects_display() {
        let raw = vec![ChangeRecord {
            section: "experience".to_string(),
            field: "experience[0]".to_string(),
            path: "experience[0]".to_string(),
            change_type: ChangeKind::MoveToProjects,
            before_value: Some(json!({"title": "Side App"})),
            project_data: Some(json!({"name": "Side App", "role": "Author"})),
            ..Default::default()
        }];
        let detailed = compute_detailed_changes(&json!({}), &json!({}), raw);
        assert_eq!(detailed[0].before_display, "Experience: Side App");
        assert_eq!(detailed[0].after_display, "Project: Side App");
        assert!(detailed[0].project_data.is_some(), "projectData survives");
    }

    #[test]
    fn test_differ_output_beats_self_reported_list() {
        let previous = json!({"summary": {"description": "Old"}});
        let current = json!({"summary": {"description": "New"}});
        let raw = vec![ChangeRecord {
            section: "header".to_string(),
            field: "current_title".to_string(),
            change: "Bogus self-reported change".to_string(),
            ..Default::default()
        }];
        let changes = diff_documents(&current, &previous, Some(raw));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].section, "summary");
    }

    #[test]
    fn test_multi_renamed_passes_through() {
        let previous = json!({"summary": {"description": "Old"}});
        let current = json!({"summary": {"description": "New"}});
        let raw = vec![ChangeRecord {
            section: "skills".to_string(),
            field: "hard_skills".to_string(),
            path: "skills.hard_skills".to_string(),
            change_type: ChangeKind::MultiRenamed,
            change: "Several skills renamed".to_string(),
            ..Default::default()
        }];
        let changes = diff_documents(&current, &previous, Some(raw));
        assert_eq!(changes.len(), 2);
        assert!(changes
            .iter()
            .any(|c| c.change_type == ChangeKind::MultiRenamed));
    }

    #[test]
    fn test_raw_list_used_when_differ_finds_nothing() {
        let doc = json!({"summary": {"description": "Same"}});
        let raw = vec![ChangeRecord {
            section: "summary".to_string(),
            field: "description".to_string(),
            change: "Service claims a tweak".to_string(),
            ..Default::default()
        }];
        let changes = diff_documents(&doc, &doc.clone(), Some(raw));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change, "Service claims a tweak");
    }
}
