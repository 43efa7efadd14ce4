//! Review actions: accept or reject pending changes, singly or in batch.
//!
//! Every operation is load → mutate clones → one commit. A rejection runs
//! the partial rollback against a cloned document; an acceptance only flips
//! status (the live document already reflects the change, because the
//! rewritten version was accepted-by-default when it was produced). The
//! session is deleted the moment no pending record remains.

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::diff::classify::diff_documents;
use crate::errors::AppError;
use crate::models::change::{ChangeRecord, ReviewAction, ReviewProgress, ReviewSession};
use crate::review::rollback::apply_partial_rollback;
use crate::review::session::{all_changes_reviewed, review_progress, update_change_status};
use crate::store::{DocumentStore, DocumentWrite};

/// Result of a single accept/reject decision.
#[derive(Debug)]
pub struct ReviewOutcome {
    /// The patched document, present only when a rejection touched it.
    pub document: Option<Value>,
    /// Remaining change list; empty once the session cleared.
    pub changes: Vec<ChangeRecord>,
    pub document_updated: bool,
    pub all_reviewed: bool,
    pub progress: ReviewProgress,
}

/// Result of a batched decision; `processed_count` can be lower than the
/// number of requested ids when some were unknown or already decided.
#[derive(Debug)]
pub struct BatchReviewOutcome {
    pub document: Option<Value>,
    pub changes: Vec<ChangeRecord>,
    pub document_updated: bool,
    pub all_reviewed: bool,
    pub progress: ReviewProgress,
    pub processed_count: usize,
}

/// Creates the review session for a freshly produced document version by
/// diffing the live content against the snapshot it was derived from.
/// Returns the classified changes; an empty diff leaves no session behind.
pub async fn initialize_review(
    store: &dyn DocumentStore,
    document_id: Uuid,
    source_version: i32,
    raw_changes: Option<Vec<ChangeRecord>>,
) -> Result<Vec<ChangeRecord>, AppError> {
    let record = store.load(document_id).await?;
    let previous = store
        .load_version(document_id, source_version)
        .await?
        .unwrap_or_else(|| Value::Object(Default::default()));

    let changes = diff_documents(&record.content, &previous, raw_changes);
    info!(
        "Initialized review for {document_id}: {} changes against version {source_version}",
        changes.len()
    );

    if changes.is_empty() {
        return Ok(changes);
    }

    store
        .commit(
            document_id,
            record.revision,
            DocumentWrite {
                content: None,
                session: Some(ReviewSession {
                    document_id,
                    source_version,
                    changes: changes.clone(),
                }),
            },
        )
        .await?;

    Ok(changes)
}

/// Accepts or rejects one pending change. The id must exist and still be
/// pending; deciding the same id twice is `NotFound` the second time.
pub async fn process_review_action(
    store: &dyn DocumentStore,
    document_id: Uuid,
    change_id: &str,
    action: ReviewAction,
) -> Result<ReviewOutcome, AppError> {
    let record = store.load(document_id).await?;
    let Some(mut session) = record.session else {
        return Err(AppError::NotFound(format!(
            "No pending changes for document {document_id}"
        )));
    };

    let change = session
        .changes
        .iter()
        .find(|c| c.id == change_id && c.is_pending())
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Change not found: {change_id}")))?;

    let mut document = None;
    if action == ReviewAction::Reject {
        document = Some(apply_partial_rollback(&record.content, &change));
    }
    let document_updated = document.is_some();

    update_change_status(&mut session.changes, change_id, action.decided_status());
    let all_reviewed = all_changes_reviewed(&session.changes);
    let progress = review_progress(&session.changes);
    let remaining = if all_reviewed {
        Vec::new()
    } else {
        session.changes.clone()
    };

    store
        .commit(
            document_id,
            record.revision,
            DocumentWrite {
                content: document.clone(),
                session: (!all_reviewed).then_some(session),
            },
        )
        .await?;

    Ok(ReviewOutcome {
        document,
        changes: remaining,
        document_updated,
        all_reviewed,
        progress,
    })
}

/// Accepts or rejects a batch of ids against one cloned document and one
/// persistence write. Unknown or already-decided ids are skipped with a
/// warning; they never abort the rest of the batch.
pub async fn process_batch_review_action(
    store: &dyn DocumentStore,
    document_id: Uuid,
    change_ids: &[String],
    action: ReviewAction,
) -> Result<BatchReviewOutcome, AppError> {
    if change_ids.is_empty() {
        return Err(AppError::Validation("No change ids provided".to_string()));
    }

    let record = store.load(document_id).await?;
    let Some(mut session) = record.session else {
        return Err(AppError::NotFound(format!(
            "No pending changes for document {document_id}"
        )));
    };

    let mut document = record.content.clone();
    let mut document_updated = false;
    let mut processed_count = 0usize;

    for change_id in change_ids {
        let Some(change) = session
            .changes
            .iter()
            .find(|c| &c.id == change_id && c.is_pending())
            .cloned()
        else {
            warn!(%document_id, change_id = %change_id, "batch review: change not found or not pending, skipping");
            continue;
        };

        if action == ReviewAction::Reject {
            document = apply_partial_rollback(&document, &change);
            document_updated = true;
        }
        update_change_status(&mut session.changes, change_id, action.decided_status());
        processed_count += 1;
    }

    let all_reviewed = all_changes_reviewed(&session.changes);
    let progress = review_progress(&session.changes);
    let remaining = if all_reviewed {
        Vec::new()
    } else {
        session.changes.clone()
    };

    store
        .commit(
            document_id,
            record.revision,
            DocumentWrite {
                content: document_updated.then(|| document.clone()),
                session: (!all_reviewed).then_some(session),
            },
        )
        .await?;

    info!(
        "Batch review on {document_id}: processed {processed_count}/{} ids",
        change_ids.len()
    );

    Ok(BatchReviewOutcome {
        document: document_updated.then_some(document),
        changes: remaining,
        document_updated,
        all_reviewed,
        progress,
        processed_count,
    })
}

/// Accepts or rejects every still-pending change in one pass. Same sequence
/// as the batch variant, with the id list taken from the session itself.
pub async fn process_review_all(
    store: &dyn DocumentStore,
    document_id: Uuid,
    action: ReviewAction,
) -> Result<BatchReviewOutcome, AppError> {
    let record = store.load(document_id).await?;
    let Some(session) = record.session else {
        return Err(AppError::NotFound(format!(
            "No pending changes for document {document_id}"
        )));
    };
    let pending_ids: Vec<String> = session
        .changes
        .iter()
        .filter(|c| c.is_pending())
        .map(|c| c.id.clone())
        .collect();

    process_batch_review_action(store, document_id, &pending_ids, action).await
}
