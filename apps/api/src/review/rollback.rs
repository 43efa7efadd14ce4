//! Partial rollback: the exact inverse of one change, applied to a clone of
//! the live document.
//!
//! Rejecting a change must never damage anything else, so the applier is
//! pure (clone, mutate the clone, return it) and never fails: a change whose
//! required fields are missing, or whose target can no longer be found in
//! the document, degrades to a logged no-op on that one field.
//!
//! Dispatch goes through [`RollbackOp`], a sum type built fallibly from a
//! `ChangeRecord`. Every variant carries exactly the fields its inversion
//! needs, so a malformed record is rejected in one place at construction
//! instead of surfacing as a silent half-applied patch.

use serde_json::Value;
use tracing::warn;

use crate::diff::arrays::item_key;
use crate::diff::path::{set_value_at_path, value_at_path};
use crate::models::change::{ChangeKind, ChangeRecord};

/// Field-path suffixes that are scalar fields even when the record carries
/// item-style metadata. These always roll back via a plain path write.
const SIMPLE_FIELD_SUFFIXES: [&str; 9] = [
    ".title",
    ".description",
    ".company",
    ".location",
    ".type",
    ".start_date",
    ".end_date",
    ".summary",
    ".role",
];

/// A change record that cannot be inverted because a field its kind requires
/// is absent. Surfaced as a logged skip, never an abort.
#[derive(Debug, thiserror::Error)]
#[error("change {change_id} ({kind:?}) cannot be rolled back: {detail}")]
pub struct MalformedChange {
    pub change_id: String,
    pub kind: ChangeKind,
    pub detail: &'static str,
}

/// The inverse mutation for one change, with required fields resolved.
#[derive(Debug)]
enum RollbackOp<'a> {
    /// Added project rejected: drop the project whose name matches.
    RemoveAddedProject { name: String },
    /// Removed experience rejected: append it back.
    RestoreExperience { experience: &'a Value },
    /// Move rejected: append the experience back and drop the synthesized
    /// project (matched by name, or by role and summary together).
    UndoMoveToProjects {
        experience: &'a Value,
        project: Option<&'a Value>,
    },
    /// Item-level addition rejected: remove the matching item from the array
    /// at `path`.
    RemoveItem { path: &'a str, target: String },
    /// Item-level removal rejected: push the item back into the array.
    ReinsertItem { path: &'a str, item: &'a Value },
    /// Reworded language entry rejected: restore the previous object in
    /// place, matched by language name.
    RestoreLanguage {
        path: &'a str,
        name: String,
        before: &'a Value,
    },
    /// Reworded bullet rejected: find the rewritten text and put the
    /// original back.
    ReplaceBullet {
        path: &'a str,
        before: &'a str,
        after: &'a str,
    },
    /// Level adjustment rejected: restore the previous proficiency on the
    /// matching item.
    RestoreLevel {
        path: &'a str,
        item_name: String,
        before: &'a Value,
    },
    /// Anything field-shaped: write the previous value back at `path`.
    RestoreField { path: &'a str, before: &'a Value },
    /// Last resort for array fields that only kept a rendered before
    /// display: reparse the bullet lines.
    RestoreFieldFromDisplay { path: &'a str, bullets: Vec<String> },
}

fn target_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Normalized equality-or-prefix match used to find an added bullet or item
/// in its array, tolerant of truncated display names.
fn matches_bullet(item_text: &str, target: &str) -> bool {
    let item_norm = item_text.trim().to_lowercase();
    let target_norm = target.trim().to_lowercase();
    if item_norm == target_norm {
        return true;
    }
    let prefix: String = target_norm.chars().take(50).collect();
    !prefix.is_empty() && item_norm.starts_with(&prefix)
}

fn plan(change: &ChangeRecord) -> Result<RollbackOp<'_>, MalformedChange> {
    let malformed = |detail: &'static str| MalformedChange {
        change_id: change.id.clone(),
        kind: change.change_type,
        detail,
    };

    if change.path.is_empty() {
        return Err(malformed("missing path"));
    }

    // Project additions are array-valued at the section path; handled first
    // like every other special shape.
    if change.change_type == ChangeKind::Added && change.section == "projects" {
        let project = change
            .after_value
            .as_ref()
            .or(change.item_value.as_ref())
            .ok_or_else(|| malformed("added project carries no value"))?;
        let name = target_text(project).ok_or_else(|| malformed("added project has no name"))?;
        return Ok(RollbackOp::RemoveAddedProject { name });
    }

    match change.change_type {
        ChangeKind::ExperienceRemoved => {
            let experience = change
                .before_value
                .as_ref()
                .ok_or_else(|| malformed("experience_removed requires beforeValue"))?;
            return Ok(RollbackOp::RestoreExperience { experience });
        }
        ChangeKind::MoveToProjects => {
            let experience = change
                .before_value
                .as_ref()
                .ok_or_else(|| malformed("move_to_projects requires beforeValue"))?;
            return Ok(RollbackOp::UndoMoveToProjects {
                experience,
                project: change.project_data.as_ref(),
            });
        }
        _ => {}
    }

    let is_array_field = matches!(change.before_value, Some(Value::Array(_)))
        || matches!(change.after_value, Some(Value::Array(_)));
    let is_simple_field = SIMPLE_FIELD_SUFFIXES
        .iter()
        .any(|suffix| change.path.ends_with(suffix));
    let has_item_identity = change.item_name.is_some()
        || change.after_value.is_some()
        || change.before_value.is_some()
        || change.item_value.is_some();
    let item_level = matches!(
        change.change_type,
        ChangeKind::Added | ChangeKind::Removed | ChangeKind::Modified | ChangeKind::LevelAdjusted
    ) && has_item_identity
        && !is_array_field
        && !is_simple_field;

    if item_level {
        match change.change_type {
            ChangeKind::Added => {
                let target = change
                    .after_value
                    .as_ref()
                    .or(change.item_value.as_ref())
                    .and_then(target_text)
                    .or_else(|| change.item_name.clone())
                    .ok_or_else(|| malformed("added item carries no identity"))?;
                return Ok(RollbackOp::RemoveItem {
                    path: &change.path,
                    target,
                });
            }
            ChangeKind::Removed => {
                let item = change
                    .before_value
                    .as_ref()
                    .or(change.item_value.as_ref())
                    .ok_or_else(|| malformed("removed item carries no value"))?;
                return Ok(RollbackOp::ReinsertItem {
                    path: &change.path,
                    item,
                });
            }
            ChangeKind::Modified => {
                if change.section == "languages" {
                    if let Some(before @ Value::Object(_)) = change.before_value.as_ref() {
                        let name = change
                            .item_name
                            .clone()
                            .or_else(|| target_text(before))
                            .ok_or_else(|| malformed("language change has no name"))?;
                        return Ok(RollbackOp::RestoreLanguage {
                            path: &change.path,
                            name,
                            before,
                        });
                    }
                }
                let before = change
                    .before_value
                    .as_ref()
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("modified bullet requires string beforeValue"))?;
                let after = change
                    .after_value
                    .as_ref()
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("modified bullet requires string afterValue"))?;
                return Ok(RollbackOp::ReplaceBullet {
                    path: &change.path,
                    before,
                    after,
                });
            }
            ChangeKind::LevelAdjusted => {
                let item_name = change
                    .item_name
                    .clone()
                    .ok_or_else(|| malformed("level_adjusted requires itemName"))?;
                let before = change
                    .before_value
                    .as_ref()
                    .ok_or_else(|| malformed("level_adjusted requires beforeValue"))?;
                return Ok(RollbackOp::RestoreLevel {
                    path: &change.path,
                    item_name,
                    before,
                });
            }
            _ => unreachable!("item_level is limited to the four kinds above"),
        }
    }

    // Field-level restore, covering modified/reordered and whole-section
    // coarse records.
    if let Some(before) = change.before_value.as_ref().filter(|v| !v.is_null()) {
        return Ok(RollbackOp::RestoreField {
            path: &change.path,
            before,
        });
    }
    if change.change_type == ChangeKind::Modified && !change.before_display.is_empty() {
        let bullets: Vec<String> = change
            .before_display
            .lines()
            .map(|line| {
                line.trim_start_matches(['\u{2022}', '-', '*'])
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect();
        if !bullets.is_empty() {
            return Ok(RollbackOp::RestoreFieldFromDisplay {
                path: &change.path,
                bullets,
            });
        }
    }
    Err(malformed("no beforeValue to restore"))
}

fn array_at_path(document: &Value, path: &str) -> Vec<Value> {
    value_at_path(document, path)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn push_experience(document: &mut Value, experience: &Value) {
    let mut experiences = array_at_path(document, "experience");
    experiences.push(experience.clone());
    set_value_at_path(document, "experience", Value::Array(experiences));
}

fn item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other
            .get("name")
            .or_else(|| other.get("value"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}

fn apply_op(document: &mut Value, op: RollbackOp<'_>) {
    match op {
        RollbackOp::RemoveAddedProject { name } => {
            let target = name.trim().to_lowercase();
            let mut projects = array_at_path(document, "projects");
            projects.retain(|project| item_key(project) != target);
            set_value_at_path(document, "projects", Value::Array(projects));
        }
        RollbackOp::RestoreExperience { experience } => {
            push_experience(document, experience);
        }
        RollbackOp::UndoMoveToProjects {
            experience,
            project,
        } => {
            push_experience(document, experience);
            if let Some(project) = project {
                let name = field_lower(project, "name");
                let role = field_lower(project, "role");
                let summary = field_lower(project, "summary");
                let mut projects = array_at_path(document, "projects");
                projects.retain(|candidate| {
                    let name_match = !name.is_empty() && field_lower(candidate, "name") == name;
                    let role_and_summary_match = !role.is_empty()
                        && !summary.is_empty()
                        && field_lower(candidate, "role") == role
                        && field_lower(candidate, "summary") == summary;
                    !(name_match || role_and_summary_match)
                });
                set_value_at_path(document, "projects", Value::Array(projects));
            }
        }
        RollbackOp::RemoveItem { path, target } => {
            let mut items = array_at_path(document, path);
            let before_len = items.len();
            items.retain(|item| match item {
                Value::String(s) => !matches_bullet(s, &target),
                other => item_key(other) != target.trim().to_lowercase(),
            });
            if items.len() == before_len {
                warn!(path, item = %target, "rollback: added item not found, no-op");
            }
            set_value_at_path(document, path, Value::Array(items));
        }
        RollbackOp::ReinsertItem { path, item } => {
            let mut items = array_at_path(document, path);
            items.push(item.clone());
            set_value_at_path(document, path, Value::Array(items));
        }
        RollbackOp::RestoreLanguage { path, name, before } => {
            let target = name.trim().to_lowercase();
            let mut items = array_at_path(document, path);
            match items
                .iter()
                .position(|item| item_text(item).trim().to_lowercase() == target)
            {
                Some(idx) => {
                    items[idx] = before.clone();
                    set_value_at_path(document, path, Value::Array(items));
                }
                None => warn!(path, name = %name, "rollback: language not found, no-op"),
            }
        }
        RollbackOp::ReplaceBullet {
            path,
            before,
            after,
        } => {
            let target = after.trim().to_lowercase();
            let mut items = array_at_path(document, path);
            match items
                .iter()
                .position(|item| item_text(item).trim().to_lowercase() == target)
            {
                Some(idx) if !before.is_empty() => {
                    items[idx] = Value::String(before.to_string());
                    set_value_at_path(document, path, Value::Array(items));
                }
                _ => warn!(path, "rollback: rewritten bullet not found, no-op"),
            }
        }
        RollbackOp::RestoreLevel {
            path,
            item_name,
            before,
        } => {
            let target = item_name.trim().to_lowercase();
            let mut items = array_at_path(document, path);
            match items.iter().position(|item| item_key(item) == target) {
                Some(idx) => {
                    if let Value::Object(map) = &mut items[idx] {
                        map.insert("proficiency".to_string(), before.clone());
                        set_value_at_path(document, path, Value::Array(items));
                    }
                }
                None => warn!(path, item = %item_name, "rollback: item not found, no-op"),
            }
        }
        RollbackOp::RestoreField { path, before } => {
            set_value_at_path(document, path, before.clone());
        }
        RollbackOp::RestoreFieldFromDisplay { path, bullets } => {
            let items = bullets.into_iter().map(Value::String).collect();
            set_value_at_path(document, path, Value::Array(items));
        }
    }
}

fn field_lower(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Reverts exactly one change's effect on `document`, returning the patched
/// clone. Never fails: an uninvertible change logs and returns the clone
/// untouched.
pub fn apply_partial_rollback(document: &Value, change: &ChangeRecord) -> Value {
    let mut updated = document.clone();
    match plan(change) {
        Ok(op) => apply_op(&mut updated, op),
        Err(err) => warn!(error = %err, "rollback degraded to no-op"),
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(kind: ChangeKind) -> ChangeRecord {
        ChangeRecord {
            id: "change_test0001".to_string(),
            change_type: kind,
            ..Default::default()
        }
    }

    #[test]
    fn test_field_level_restore() {
        let doc = json!({"summary": {"description": "New"}});
        let mut rejected = change(ChangeKind::Modified);
        rejected.section = "summary".to_string();
        rejected.path = "summary.description".to_string();
        rejected.before_value = Some(json!("Old"));
        rejected.after_value = Some(json!("New"));
        // String before/after on a .description path is field-level, not a bullet.
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["summary"]["description"], json!("Old"));
        assert_eq!(doc["summary"]["description"], json!("New"), "input untouched");
    }

    #[test]
    fn test_restore_field_creates_missing_path() {
        let doc = json!({});
        let mut rejected = change(ChangeKind::Modified);
        rejected.path = "header.current_title".to_string();
        rejected.before_value = Some(json!("Developer"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["header"]["current_title"], json!("Developer"));
    }

    #[test]
    fn test_added_skill_removed_again() {
        let doc = json!({"skills": {"tools": ["Git", "Docker"]}});
        let mut rejected = change(ChangeKind::Added);
        rejected.section = "skills".to_string();
        rejected.path = "skills.tools".to_string();
        rejected.item_name = Some("Docker".to_string());
        rejected.after_value = Some(json!("Docker"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["skills"]["tools"], json!(["Git"]));
    }

    #[test]
    fn test_added_object_skill_removed_by_name() {
        let doc = json!({"skills": {"hard_skills": [{"name": "Rust"}, {"name": "Go"}]}});
        let mut rejected = change(ChangeKind::Added);
        rejected.path = "skills.hard_skills".to_string();
        rejected.item_value = Some(json!({"name": "Go"}));
        rejected.after_value = Some(json!("Go"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["skills"]["hard_skills"], json!([{"name": "Rust"}]));
    }

    #[test]
    fn test_removed_skill_pushed_back() {
        let doc = json!({"skills": {"tools": ["Git"]}});
        let mut rejected = change(ChangeKind::Removed);
        rejected.path = "skills.tools".to_string();
        rejected.item_name = Some("Jenkins".to_string());
        rejected.before_value = Some(json!("Jenkins"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["skills"]["tools"], json!(["Git", "Jenkins"]));
    }

    #[test]
    fn test_reworded_bullet_restored() {
        let doc = json!({"experience": [{"responsibilities": ["Led a team of 5 engineers to deliver X and Y"]}]});
        let mut rejected = change(ChangeKind::Modified);
        rejected.path = "experience[0].responsibilities".to_string();
        rejected.item_name = Some("Led a team of 5 engineers to deliver X and Y".to_string());
        rejected.before_value = Some(json!("Led a team of 5 engineers to ship X"));
        rejected.after_value = Some(json!("Led a team of 5 engineers to deliver X and Y"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(
            restored["experience"][0]["responsibilities"],
            json!(["Led a team of 5 engineers to ship X"])
        );
    }

    #[test]
    fn test_experience_removed_restored() {
        let doc = json!({"experience": [{"title": "Kept"}]});
        let mut rejected = change(ChangeKind::ExperienceRemoved);
        rejected.path = "experience[1]".to_string();
        rejected.before_value = Some(json!({"title": "Dropped", "company": "Acme"}));
        let restored = apply_partial_rollback(&doc, &rejected);
        let experiences = restored["experience"].as_array().unwrap();
        assert_eq!(experiences.len(), 2);
        assert_eq!(experiences[1]["title"], json!("Dropped"));
    }

    #[test]
    fn test_move_to_projects_undone() {
        let doc = json!({
            "experience": [],
            "projects": [
                {"name": "Side App", "role": "Author", "summary": "A thing"},
                {"name": "Other", "role": "Contributor", "summary": "Unrelated"}
            ]
        });
        let mut rejected = change(ChangeKind::MoveToProjects);
        rejected.path = "experience[0]".to_string();
        rejected.before_value = Some(json!({"title": "Side App", "company": null}));
        rejected.project_data = Some(json!({"name": "Side App", "role": "Author", "summary": "A thing"}));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["experience"][0]["title"], json!("Side App"));
        let projects = restored["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 1, "only the synthesized project is removed");
        assert_eq!(projects[0]["name"], json!("Other"));
    }

    #[test]
    fn test_move_undo_matches_by_role_and_summary_when_renamed() {
        let doc = json!({
            "experience": [],
            "projects": [{"name": "Renamed", "role": "Author", "summary": "A thing"}]
        });
        let mut rejected = change(ChangeKind::MoveToProjects);
        rejected.path = "experience[0]".to_string();
        rejected.before_value = Some(json!({"title": "Side App"}));
        rejected.project_data =
            Some(json!({"name": "Side App", "role": "Author", "summary": "A thing"}));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert!(restored["projects"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_added_project_removed() {
        let doc = json!({"projects": [{"name": "New Thing"}, {"name": "Old Thing"}]});
        let mut rejected = change(ChangeKind::Added);
        rejected.section = "projects".to_string();
        rejected.path = "projects[0]".to_string();
        rejected.after_value = Some(json!({"name": "New Thing"}));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["projects"], json!([{"name": "Old Thing"}]));
    }

    #[test]
    fn test_language_modified_restored_by_name() {
        let doc = json!({"languages": [
            {"name": "English", "level": "fluent"},
            {"name": "German", "level": "intermediate"}
        ]});
        let mut rejected = change(ChangeKind::Modified);
        rejected.section = "languages".to_string();
        rejected.path = "languages".to_string();
        rejected.item_name = Some("German".to_string());
        rejected.before_value = Some(json!({"name": "German", "level": "beginner"}));
        rejected.after_value = Some(json!({"name": "German", "level": "intermediate"}));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["languages"][1]["level"], json!("beginner"));
        assert_eq!(restored["languages"][0]["level"], json!("fluent"));
    }

    #[test]
    fn test_level_adjusted_restored() {
        let doc = json!({"skills": {"hard_skills": [{"name": "Rust", "proficiency": 4}]}});
        let mut rejected = change(ChangeKind::LevelAdjusted);
        rejected.path = "skills.hard_skills".to_string();
        rejected.item_name = Some("Rust".to_string());
        rejected.before_value = Some(json!(2));
        rejected.after_value = Some(json!(4));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["skills"]["hard_skills"][0]["proficiency"], json!(2));
    }

    #[test]
    fn test_coarse_section_record_restores_whole_array() {
        let doc = json!({"education": []});
        let mut rejected = change(ChangeKind::Modified);
        rejected.section = "education".to_string();
        rejected.path = "education".to_string();
        rejected.before_value = Some(json!([{"degree": "BSc"}]));
        rejected.after_value = Some(json!([]));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["education"], json!([{"degree": "BSc"}]));
    }

    #[test]
    fn test_missing_before_value_is_noop() {
        let doc = json!({"summary": {"description": "Kept"}});
        let mut rejected = change(ChangeKind::Modified);
        rejected.path = "summary.description".to_string();
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored, doc, "nothing to restore means nothing changes");
    }

    #[test]
    fn test_before_display_fallback_reconstructs_bullets() {
        let doc = json!({"experience": [{"responsibilities": ["new one"]}]});
        let mut rejected = change(ChangeKind::Modified);
        rejected.path = "experience[0].responsibilities".to_string();
        rejected.before_display = "\u{2022} First duty\n\u{2022} Second duty".to_string();
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(
            restored["experience"][0]["responsibilities"],
            json!(["First duty", "Second duty"])
        );
    }

    #[test]
    fn test_target_absent_from_array_is_noop() {
        let doc = json!({"skills": {"tools": ["Git"]}});
        let mut rejected = change(ChangeKind::Added);
        rejected.path = "skills.tools".to_string();
        rejected.after_value = Some(json!("Terraform"));
        let restored = apply_partial_rollback(&doc, &rejected);
        assert_eq!(restored["skills"]["tools"], json!(["Git"]));
    }

    #[test]
    fn test_double_rollback_of_added_item_is_idempotent() {
        let doc = json!({"skills": {"tools": ["Git", "Docker"]}});
        let mut rejected = change(ChangeKind::Added);
        rejected.path = "skills.tools".to_string();
        rejected.after_value = Some(json!("Docker"));
        let once = apply_partial_rollback(&doc, &rejected);
        let twice = apply_partial_rollback(&once, &rejected);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_diff_record_rolls_back_to_before_values() {
        // Round trip: each record from a real diff, rejected independently
        // against the after-document, lands back on the before-document's
        // value at its path (or the affected array).
        use crate::diff::classify::diff_documents;
        use crate::diff::path::value_at_path;

        let before = json!({
            "header": {"current_title": "Backend Developer"},
            "summary": {"description": "Seasoned backend developer."},
            "skills": {"hard_skills": [{"name": "Java"}], "tools": ["Git", "Jenkins"]},
            "experience": [{
                "title": "Backend Developer", "company": "Acme",
                "description": "Built services",
                "responsibilities": ["Led a team of 5 engineers to ship X"]
            }],
            "education": [{"degree": "BSc", "institution": "MIT"}],
            "languages": []
        });
        let after = json!({
            "header": {"current_title": "Platform Engineer"},
            "summary": {"description": "Reliability-minded platform engineer."},
            "skills": {"hard_skills": [{"name": "Java"}, {"name": "Rust"}], "tools": ["Git"]},
            "experience": [{
                "title": "Backend Developer", "company": "Acme",
                "description": "Built services",
                "responsibilities": ["Led a team of 5 engineers to ship X, Y and Z"]
            }],
            "education": [],
            "languages": []
        });

        let changes = diff_documents(&after, &before, None);
        assert!(changes.len() >= 6, "expected a spread of kinds: {changes:?}");

        for change in &changes {
            let restored = apply_partial_rollback(&after, change);
            let restored_at = value_at_path(&restored, &change.path);
            let before_at = value_at_path(&before, &change.path);
            match change.change_type {
                ChangeKind::Added | ChangeKind::Removed => {
                    // The affected array regains / sheds exactly that item.
                    let restored_arr = restored_at.and_then(Value::as_array).unwrap();
                    let key = change.item_name.as_deref().unwrap().to_lowercase();
                    let present = restored_arr
                        .iter()
                        .any(|i| item_key(i) == key || item_text(i).to_lowercase() == key);
                    assert_eq!(
                        present,
                        change.change_type == ChangeKind::Removed,
                        "added items vanish, removed items return: {change:?}"
                    );
                }
                _ => {
                    assert_eq!(
                        restored_at, before_at,
                        "field at {} must equal the before-document's value",
                        change.path
                    );
                }
            }
        }
    }
}
