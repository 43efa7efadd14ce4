//! Ordered diff over free-text bullet lists (responsibilities, deliverables).
//!
//! Matching is greedy, in two passes over a shrinking pool: exact on
//! normalized text, then fuzzy on the first five words. A fuzzy pair is a
//! rewording (`modified`); leftovers are `added`/`removed`. This is a
//! nearest-neighbor heuristic, not an assignment solver: lists with many
//! near-identical bullets can mis-pair, which is acceptable at the single
//! digit bullet counts a résumé entry carries.

use std::collections::HashSet;

use serde_json::Value;

use crate::models::change::{ChangeKind, ChangeRecord};

/// Lowercase, trim, strip trailing punctuation.
fn normalize_bullet(bullet: &str) -> String {
    bullet
        .trim()
        .to_lowercase()
        .trim_end_matches(['.', ',', ':', ';', '!', '?'])
        .trim()
        .to_string()
}

/// First five words, lowercased. The fuzzy-match identity of a bullet.
fn significant_start(bullet: &str) -> String {
    bullet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .take(5)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncated label for display lists.
fn bullet_label(bullet: &str) -> String {
    let truncated: String = bullet.chars().take(50).collect();
    if bullet.chars().count() > 50 {
        format!("{truncated}...")
    } else {
        truncated
    }
}

fn noun_for(field: &str) -> &'static str {
    if field == "deliverables" {
        "Deliverable"
    } else {
        "Responsibility"
    }
}

/// Diffs two ordered bullet lists for one experience entry.
pub fn diff_bullets(
    current: &[String],
    previous: &[String],
    section: &str,
    field: &str,
    base_path: &str,
    exp_index: usize,
    exp_title: &str,
) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    let current_normalized: Vec<String> = current.iter().map(|b| normalize_bullet(b)).collect();
    let previous_normalized: Vec<String> = previous.iter().map(|b| normalize_bullet(b)).collect();
    let current_starts: Vec<String> = current.iter().map(|b| significant_start(b)).collect();
    let previous_starts: Vec<String> = previous.iter().map(|b| significant_start(b)).collect();

    let mut matched_previous: HashSet<usize> = HashSet::new();
    let mut matched_current: HashSet<usize> = HashSet::new();

    // Exact pass.
    for (idx, normalized) in current_normalized.iter().enumerate() {
        let hit = previous_normalized
            .iter()
            .enumerate()
            .position(|(i, p)| p == normalized && !matched_previous.contains(&i));
        if let Some(prev_idx) = hit {
            matched_previous.insert(prev_idx);
            matched_current.insert(idx);
        }
    }

    // Fuzzy pass: same five-word prefix means the bullet was reworded.
    for (idx, bullet) in current.iter().enumerate() {
        if matched_current.contains(&idx) || current_starts[idx].is_empty() {
            continue;
        }
        let hit = previous_starts
            .iter()
            .enumerate()
            .position(|(i, p)| *p == current_starts[idx] && !matched_previous.contains(&i));
        let Some(prev_idx) = hit else {
            continue;
        };
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            exp_index: Some(exp_index),
            bullet_index: Some(idx),
            item_name: Some(bullet_label(bullet)),
            change_type: ChangeKind::Modified,
            before_value: Some(Value::String(previous[prev_idx].clone())),
            after_value: Some(Value::String(bullet.clone())),
            change: format!("{} reworded in \"{exp_title}\"", noun_for(field)),
            reason: "Rephrased for the target role".to_string(),
            ..Default::default()
        });
        matched_previous.insert(prev_idx);
        matched_current.insert(idx);
    }

    for (idx, bullet) in current.iter().enumerate() {
        if matched_current.contains(&idx) {
            continue;
        }
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            exp_index: Some(exp_index),
            bullet_index: Some(idx),
            item_name: Some(bullet_label(bullet)),
            change_type: ChangeKind::Added,
            item_value: Some(Value::String(bullet.clone())),
            after_value: Some(Value::String(bullet.clone())),
            change: format!("New {} in \"{exp_title}\"", noun_for(field).to_lowercase()),
            reason: "Added for the target role".to_string(),
            ..Default::default()
        });
    }

    for (idx, bullet) in previous.iter().enumerate() {
        if matched_previous.contains(&idx) {
            continue;
        }
        changes.push(ChangeRecord {
            section: section.to_string(),
            field: field.to_string(),
            path: base_path.to_string(),
            exp_index: Some(exp_index),
            bullet_index: Some(idx),
            item_name: Some(bullet_label(bullet)),
            change_type: ChangeKind::Removed,
            item_value: Some(Value::String(bullet.clone())),
            before_value: Some(Value::String(bullet.clone())),
            change: format!("{} dropped from \"{exp_title}\"", noun_for(field)),
            reason: "Not relevant to the target role".to_string(),
            ..Default::default()
        });
    }

    changes
}
