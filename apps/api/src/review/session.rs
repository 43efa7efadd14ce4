//! Review session bookkeeping: per-change status transitions, completion
//! detection, and progress reporting.

use chrono::Utc;

use crate::models::change::{ChangeRecord, ChangeStatus, ReviewProgress};

/// Marks the record with `change_id` as decided, stamping `reviewed_at`.
/// Unknown ids leave the list untouched.
pub fn update_change_status(changes: &mut [ChangeRecord], change_id: &str, status: ChangeStatus) {
    for change in changes.iter_mut() {
        if change.id == change_id {
            change.status = status;
            change.reviewed_at = Some(Utc::now());
        }
    }
}

/// True once no record is pending. An empty list counts as fully reviewed.
pub fn all_changes_reviewed(changes: &[ChangeRecord]) -> bool {
    changes.iter().all(|change| !change.is_pending())
}

/// Progress over the full change list. `percent_complete` is 100 for an
/// empty list so a document without a session reads as fully reviewed.
pub fn review_progress(changes: &[ChangeRecord]) -> ReviewProgress {
    let total = changes.len();
    let reviewed = changes.iter().filter(|c| !c.is_pending()).count();
    let pending = total - reviewed;
    let percent_complete = if total > 0 {
        ((reviewed as f64 / total as f64) * 100.0).round() as u32
    } else {
        100
    };
    ReviewProgress {
        total,
        reviewed,
        pending,
        percent_complete,
    }
}

/// The client-facing projection: decided records stay in storage for
/// history but only pending ones are shown.
pub fn pending_only(changes: &[ChangeRecord]) -> Vec<ChangeRecord> {
    changes
        .iter()
        .filter(|c| c.is_pending())
        .cloned()
        .collect()
}
