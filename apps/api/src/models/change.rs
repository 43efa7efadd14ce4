//! Change data model for the CV review lifecycle.
//!
//! A `ChangeRecord` is one reviewable unit of difference between two document
//! versions. Records are stored as JSON (camelCase keys) alongside the CV they
//! belong to, so the serde names here are the wire and storage format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Closed taxonomy of change kinds the differ produces.
///
/// `MultiRenamed` is never produced by the differ itself; a generation
/// service may self-report it and it passes through the review lifecycle
/// opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    LevelAdjusted,
    Reordered,
    MoveToProjects,
    ExperienceRemoved,
    MultiRenamed,
}

impl Default for ChangeKind {
    fn default() -> Self {
        ChangeKind::Modified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Accepted,
    Rejected,
}

impl Default for ChangeStatus {
    fn default() -> Self {
        ChangeStatus::Pending
    }
}

/// A user decision on a single change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Accept,
    Reject,
}

impl ReviewAction {
    /// Parses the wire form. Anything other than accept/reject is invalid.
    pub fn parse(raw: &str) -> Option<ReviewAction> {
        match raw {
            "accept" => Some(ReviewAction::Accept),
            "reject" => Some(ReviewAction::Reject),
            _ => None,
        }
    }

    pub fn decided_status(self) -> ChangeStatus {
        match self {
            ReviewAction::Accept => ChangeStatus::Accepted,
            ReviewAction::Reject => ChangeStatus::Rejected,
        }
    }
}

/// One classified, reviewable difference between two CV versions.
///
/// Raw differ output leaves `id`, the display strings and `status` at their
/// defaults; the classifier fills them before a record enters a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeRecord {
    pub id: String,
    pub section: String,
    pub field: String,
    pub path: String,
    pub change_type: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_data: Option<Value>,
    pub before_display: String,
    pub after_display: String,
    /// Short human summary of what changed.
    pub change: String,
    /// Human rationale for the change.
    pub reason: String,
    pub status: ChangeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ChangeRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }
}

/// The live set of changes tied to one document and one snapshot version.
///
/// Exists only while at least one record is pending; cleared from the store
/// the moment every record has been decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub document_id: Uuid,
    pub source_version: i32,
    pub changes: Vec<ChangeRecord>,
}

/// Review progress over a session's change list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewProgress {
    pub total: usize,
    pub reviewed: usize,
    pub pending: usize,
    pub percent_complete: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ChangeKind::MoveToProjects).unwrap();
        assert_eq!(json, "\"move_to_projects\"");
        let json = serde_json::to_string(&ChangeKind::LevelAdjusted).unwrap();
        assert_eq!(json, "\"level_adjusted\"");
    }

    #[test]
    fn test_record_round_trips_camel_case() {
        let record = ChangeRecord {
            id: "change_ab12cd34".to_string(),
            section: "skills".to_string(),
            field: "hard_skills".to_string(),
            path: "skills.hard_skills".to_string(),
            change_type: ChangeKind::Added,
            item_name: Some("Rust".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["changeType"], "added");
        assert_eq!(json["itemName"], "Rust");
        let back: ChangeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.change_type, ChangeKind::Added);
        assert!(back.is_pending());
    }

    #[test]
    fn test_service_reported_record_with_missing_fields_deserializes() {
        // Self-reported lists are less strict than differ output.
        let raw = serde_json::json!({
            "section": "summary",
            "field": "description"
        });
        let record: ChangeRecord = serde_json::from_value(raw).unwrap();
        assert!(record.id.is_empty());
        assert_eq!(record.change_type, ChangeKind::Modified);
        assert_eq!(record.status, ChangeStatus::Pending);
    }

    #[test]
    fn test_invalid_action_rejected() {
        assert!(ReviewAction::parse("accept").is_some());
        assert!(ReviewAction::parse("reject").is_some());
        assert!(ReviewAction::parse("defer").is_none());
    }
}
