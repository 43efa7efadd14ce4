//! Whole-document structural diff between two CV versions.
//!
//! Walks the fixed document shape section by section, delegating flat
//! collections to [`diff_collection`] and bullet lists to [`diff_bullets`].
//! Experience entries are identity-matched across versions; a vanished
//! experience is checked against newly-appeared projects before being
//! reported as removed, so "this job became a project" reads as one move
//! rather than a removal plus an unrelated addition.
//!
//! Education, languages and projects get one coarse `modified` record for
//! the whole section when anything differs. Item-level detail for those
//! three is a deliberate simplification, not an oversight.

use std::collections::HashSet;

use serde_json::Value;

use crate::diff::arrays::{diff_collection, item_key};
use crate::diff::bullets::diff_bullets;
use crate::models::change::{ChangeKind, ChangeRecord};

const SKILL_CATEGORIES: [&str; 4] = ["hard_skills", "soft_skills", "tools", "methodologies"];

/// Collapses runs of whitespace so cosmetic reflows don't read as rewrites.
fn normalize_str(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deep inequality with the document's comparison semantics: null and empty
/// are interchangeable, strings compare whitespace-normalized, and arrays
/// compare as multisets (permutations are equal).
pub fn values_are_different(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => false,
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => !s.trim().is_empty(),
        (Value::Null, Value::Array(items)) | (Value::Array(items), Value::Null) => {
            !items.is_empty()
        }
        (Value::Null, _) | (_, Value::Null) => true,
        (Value::String(a), Value::String(b)) => normalize_str(a) != normalize_str(b),
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return true;
            }
            let mut sorted_a: Vec<String> = a.iter().map(|v| v.to_string()).collect();
            let mut sorted_b: Vec<String> = b.iter().map(|v| v.to_string()).collect();
            sorted_a.sort();
            sorted_b.sort();
            sorted_a != sorted_b
        }
        (a, b) => a != b,
    }
}

fn str_at<'a>(doc: &'a Value, outer: &str, inner: &str) -> &'a str {
    doc.get(outer)
        .and_then(|v| v.get(inner))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn array_at<'a>(doc: &'a Value, key: &str) -> &'a [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map_or(&[], |v| v.as_slice())
}

fn nested_array<'a>(doc: &'a Value, outer: &str, inner: &str) -> &'a [Value] {
    doc.get(outer)
        .and_then(|v| v.get(inner))
        .and_then(Value::as_array)
        .map_or(&[], |v| v.as_slice())
}

fn field_str<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}

fn field_lower(item: &Value, key: &str) -> String {
    field_str(item, key).trim().to_lowercase()
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Matches one experience against a list: exact `(title, company)` first,
/// then title-only.
fn match_experience(exp: &Value, candidates: &[Value]) -> Option<usize> {
    let title = field_lower(exp, "title");
    let company = field_lower(exp, "company");

    if let Some(idx) = candidates
        .iter()
        .position(|c| field_lower(c, "title") == title && field_lower(c, "company") == company)
    {
        return Some(idx);
    }
    candidates
        .iter()
        .position(|c| field_lower(c, "title") == title)
}

/// Looks for a project that appeared in this version and plausibly carries a
/// vanished experience: same role or name, overlapping summary, or a shared
/// tech-stack entry. Projects already claimed by an earlier move are skipped.
fn find_matching_new_project<'a>(
    exp: &Value,
    current_projects: &'a [Value],
    previous_projects: &[Value],
    claimed: &HashSet<String>,
) -> Option<&'a Value> {
    let exp_title = field_lower(exp, "title");
    let exp_company = field_lower(exp, "company");
    let exp_description = field_lower(exp, "description");
    let exp_skills: Vec<String> = string_items(exp.get("skills_used"))
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    for project in current_projects {
        let name = field_lower(project, "name");
        if claimed.contains(&name) {
            continue;
        }
        let summary = field_lower(project, "summary");
        let existed_before = previous_projects.iter().any(|p| {
            (!name.is_empty() && field_lower(p, "name") == name)
                || (!summary.is_empty() && field_lower(p, "summary") == summary)
        });
        if existed_before {
            continue;
        }

        let role_match = !exp_title.is_empty() && field_lower(project, "role") == exp_title;
        let name_match = !name.is_empty()
            && ((!exp_title.is_empty() && name == exp_title)
                || (!exp_company.is_empty() && name == exp_company));
        let summary_match = !exp_description.is_empty()
            && summary.contains(&exp_description.chars().take(50).collect::<String>());
        let tech_match = !exp_skills.is_empty()
            && string_items(project.get("tech_stack"))
                .iter()
                .any(|t| exp_skills.contains(&t.trim().to_lowercase()));

        if role_match || name_match || summary_match || tech_match {
            return Some(project);
        }
    }
    None
}

fn coarse_section_record(section: &str, before: &[Value], after: &[Value]) -> ChangeRecord {
    ChangeRecord {
        section: section.to_string(),
        field: section.to_string(),
        path: section.to_string(),
        change_type: ChangeKind::Modified,
        before_value: Some(Value::Array(before.to_vec())),
        after_value: Some(Value::Array(after.to_vec())),
        change: format!("{section} section updated"),
        reason: "Adapted to the target role".to_string(),
        ..Default::default()
    }
}

/// Computes the raw structural diff between `current` (after) and `previous`
/// (before). Output is unclassified: ids, display strings and statuses are
/// filled by the classifier.
pub fn compute_document_diff(current: &Value, previous: &Value) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    if !current.is_object() || !previous.is_object() {
        return changes;
    }

    // Summary: whole-string comparison, no item-level detail.
    let current_summary = str_at(current, "summary", "description");
    let previous_summary = str_at(previous, "summary", "description");
    if values_are_different(
        &Value::String(current_summary.to_string()),
        &Value::String(previous_summary.to_string()),
    ) {
        changes.push(ChangeRecord {
            section: "summary".to_string(),
            field: "description".to_string(),
            path: "summary.description".to_string(),
            change_type: ChangeKind::Modified,
            before_value: Some(Value::String(previous_summary.to_string())),
            after_value: Some(Value::String(current_summary.to_string())),
            change: "Profile description adapted".to_string(),
            reason: "Adapted to the target role".to_string(),
            ..Default::default()
        });
    }

    // Skill categories: one order-independent pass each.
    for category in SKILL_CATEGORIES {
        changes.extend(diff_collection(
            nested_array(current, "skills", category),
            nested_array(previous, "skills", category),
            "skills",
            category,
            &format!("skills.{category}"),
        ));
    }

    let current_experiences = array_at(current, "experience");
    let previous_experiences = array_at(previous, "experience");
    let current_projects = array_at(current, "projects");
    let previous_projects = array_at(previous, "projects");

    // Vanished experiences: moved to projects, or removed outright.
    let mut claimed_projects: HashSet<String> = HashSet::new();
    for (original_index, previous_exp) in previous_experiences.iter().enumerate() {
        if match_experience(previous_exp, current_experiences).is_some() {
            continue;
        }
        let title = field_str(previous_exp, "title");
        let title_label = if title.is_empty() { "Untitled" } else { title };
        if let Some(project) = find_matching_new_project(
            previous_exp,
            current_projects,
            previous_projects,
            &claimed_projects,
        ) {
            claimed_projects.insert(field_lower(project, "name"));
            changes.push(ChangeRecord {
                section: "experience".to_string(),
                field: format!("experience[{original_index}]"),
                path: format!("experience[{original_index}]"),
                change_type: ChangeKind::MoveToProjects,
                before_value: Some(previous_exp.clone()),
                project_data: Some(project.clone()),
                change: format!("Experience \"{title_label}\" moved to Projects"),
                reason: "Reads better as a project for the target role".to_string(),
                ..Default::default()
            });
        } else {
            changes.push(ChangeRecord {
                section: "experience".to_string(),
                field: format!("experience[{original_index}]"),
                path: format!("experience[{original_index}]"),
                change_type: ChangeKind::ExperienceRemoved,
                before_value: Some(previous_exp.clone()),
                change: format!("Experience \"{title_label}\" removed"),
                reason: "Not relevant to the target role".to_string(),
                ..Default::default()
            });
        }
    }

    // Newly-appeared experiences, expressed on the experience collection so
    // the item-level rollback can invert them by title.
    for current_exp in current_experiences {
        if match_experience(current_exp, previous_experiences).is_some() {
            continue;
        }
        let title = field_str(current_exp, "title");
        let title_label = if title.is_empty() { "Untitled" } else { title };
        changes.push(ChangeRecord {
            section: "experience".to_string(),
            field: "experience".to_string(),
            path: "experience".to_string(),
            change_type: ChangeKind::Added,
            item_name: Some(title_label.to_string()),
            item_value: Some(current_exp.clone()),
            after_value: Some(current_exp.clone()),
            change: format!("Experience \"{title_label}\" added"),
            reason: "Relevant to the target role".to_string(),
            ..Default::default()
        });
    }

    // Surviving experiences: field, bullet and skills_used detail.
    for (current_idx, current_exp) in current_experiences.iter().enumerate() {
        let Some(previous_idx) = match_experience(current_exp, previous_experiences) else {
            continue;
        };
        let previous_exp = &previous_experiences[previous_idx];
        if !values_are_different(current_exp, previous_exp) {
            continue;
        }

        let exp_title = {
            let t = field_str(current_exp, "title");
            if t.is_empty() {
                field_str(previous_exp, "title").to_string()
            } else {
                t.to_string()
            }
        };

        let current_description = field_str(current_exp, "description");
        let previous_description = field_str(previous_exp, "description");
        if values_are_different(
            &Value::String(current_description.to_string()),
            &Value::String(previous_description.to_string()),
        ) {
            changes.push(ChangeRecord {
                section: "experience".to_string(),
                field: "description".to_string(),
                path: format!("experience[{current_idx}].description"),
                exp_index: Some(current_idx),
                change_type: ChangeKind::Modified,
                item_name: Some("Description".to_string()),
                before_value: Some(Value::String(previous_description.to_string())),
                after_value: Some(Value::String(current_description.to_string())),
                change: format!("Description reworked in \"{exp_title}\""),
                reason: "Adapted to the target role".to_string(),
                ..Default::default()
            });
        }

        for bullet_field in ["responsibilities", "deliverables"] {
            let current_bullets = string_items(current_exp.get(bullet_field));
            let previous_bullets = string_items(previous_exp.get(bullet_field));
            changes.extend(diff_bullets(
                &current_bullets,
                &previous_bullets,
                "experience",
                bullet_field,
                &format!("experience[{current_idx}].{bullet_field}"),
                current_idx,
                &exp_title,
            ));
        }

        let mut skills_used_changes = diff_collection(
            current_exp
                .get("skills_used")
                .and_then(Value::as_array)
                .map_or(&[], |v| v.as_slice()),
            previous_exp
                .get("skills_used")
                .and_then(Value::as_array)
                .map_or(&[], |v| v.as_slice()),
            "experience",
            "skills_used",
            &format!("experience[{current_idx}].skills_used"),
        );
        for change in &mut skills_used_changes {
            change.exp_index = Some(current_idx);
        }
        changes.extend(skills_used_changes);
    }

    // Education and languages: one coarse record per section when anything
    // differs. No item-level detail at this layer.
    for section in ["education", "languages"] {
        let current_items = array_at(current, section);
        let previous_items = array_at(previous, section);
        if values_are_different(
            &Value::Array(current_items.to_vec()),
            &Value::Array(previous_items.to_vec()),
        ) {
            changes.push(coarse_section_record(section, previous_items, current_items));
        }
    }

    // Extras remain item-level: they behave like a flat named collection.
    changes.extend(diff_collection(
        array_at(current, "extras"),
        array_at(previous, "extras"),
        "extras",
        "extras",
        "extras",
    ));

    // Projects: coarse, with move-claimed projects excluded so a move is not
    // double-reported as a project addition.
    let filtered_projects: Vec<Value> = current_projects
        .iter()
        .filter(|p| !claimed_projects.contains(&item_key(p)))
        .cloned()
        .collect();
    if values_are_different(
        &Value::Array(filtered_projects.clone()),
        &Value::Array(previous_projects.to_vec()),
    ) {
        changes.push(coarse_section_record(
            "projects",
            previous_projects,
            &filtered_projects,
        ));
    }

    // Header title.
    let current_title = str_at(current, "header", "current_title");
    let previous_title = str_at(previous, "header", "current_title");
    if values_are_different(
        &Value::String(current_title.to_string()),
        &Value::String(previous_title.to_string()),
    ) {
        changes.push(ChangeRecord {
            section: "header".to_string(),
            field: "current_title".to_string(),
            path: "header.current_title".to_string(),
            change_type: ChangeKind::Modified,
            before_value: Some(Value::String(previous_title.to_string())),
            after_value: Some(Value::String(current_title.to_string())),
            change: "Job title adapted".to_string(),
            reason: "Aligned with the target role".to_string(),
            ..Default::default()
        });
    }

    changes
}
