//! Axum route handlers for the Diff & Review API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::diff::classify::diff_documents;
use crate::errors::AppError;
use crate::models::change::{ChangeRecord, ReviewAction, ReviewProgress};
use crate::review::actions::{
    initialize_review, process_batch_review_action, process_review_action, process_review_all,
};
use crate::review::session::{pending_only, review_progress};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DiffRequest {
    pub current: Value,
    pub previous: Value,
    #[serde(default)]
    pub changes: Option<Vec<ChangeRecord>>,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub changes: Vec<ChangeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReviewRequest {
    pub source_version: i32,
    #[serde(default)]
    pub changes: Option<Vec<ChangeRecord>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReviewResponse {
    pub changes: Vec<ChangeRecord>,
    pub progress: ReviewProgress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStateResponse {
    pub document_id: Uuid,
    pub pending_changes: Vec<ChangeRecord>,
    pub pending_source_version: Option<i32>,
    pub progress: ReviewProgress,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    #[serde(default)]
    pub change_id: Option<String>,
    #[serde(default)]
    pub change_ids: Option<Vec<String>>,
    /// Accept or reject every pending change at once.
    #[serde(default)]
    pub all: bool,
    pub action: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
    pub updated_changes: Vec<ChangeRecord>,
    pub document_updated: bool,
    pub all_reviewed: bool,
    pub progress: ReviewProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_count: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/diff
///
/// Stateless structural diff of two documents, optionally merging a
/// generation service's self-reported change list. Nothing is persisted.
pub async fn handle_diff(
    Json(request): Json<DiffRequest>,
) -> Result<Json<DiffResponse>, AppError> {
    if !request.current.is_object() || !request.previous.is_object() {
        return Err(AppError::Validation(
            "current and previous must be CV documents".to_string(),
        ));
    }
    let changes = diff_documents(&request.current, &request.previous, request.changes);
    Ok(Json(DiffResponse { changes }))
}

/// POST /api/v1/cvs/:id/review
///
/// Creates the review session for a document by diffing its live content
/// against the snapshot at `sourceVersion`.
pub async fn handle_init_review(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<InitReviewRequest>,
) -> Result<Json<InitReviewResponse>, AppError> {
    let changes = initialize_review(
        state.store.as_ref(),
        document_id,
        request.source_version,
        request.changes,
    )
    .await?;
    let progress = review_progress(&changes);
    Ok(Json(InitReviewResponse { changes, progress }))
}

/// GET /api/v1/cvs/:id/changes
///
/// Current review state. Decided records stay in storage until the session
/// clears, but only pending ones are returned; a document without a session
/// reads as fully reviewed.
pub async fn handle_get_changes(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<ReviewStateResponse>, AppError> {
    let record = state.store.load(document_id).await?;

    let response = match record.session {
        Some(session) => ReviewStateResponse {
            document_id: session.document_id,
            progress: review_progress(&session.changes),
            pending_changes: pending_only(&session.changes),
            pending_source_version: Some(session.source_version),
        },
        None => ReviewStateResponse {
            document_id: record.id,
            pending_changes: Vec::new(),
            pending_source_version: None,
            progress: review_progress(&[]),
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/cvs/:id/changes
///
/// Accept or reject one change (`changeId`), a batch (`changeIds`), or
/// everything still pending (`all`). Batch mode skips unreviewable ids and
/// reports how many it processed.
pub async fn handle_post_changes(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, AppError> {
    let action = ReviewAction::parse(&request.action).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid action '{}': must be 'accept' or 'reject'",
            request.action
        ))
    })?;

    if request.all {
        let outcome = process_review_all(state.store.as_ref(), document_id, action).await?;
        return Ok(Json(DecideResponse {
            success: true,
            document: outcome.document,
            updated_changes: outcome.changes,
            document_updated: outcome.document_updated,
            all_reviewed: outcome.all_reviewed,
            progress: outcome.progress,
            processed_count: Some(outcome.processed_count),
        }));
    }

    if let Some(change_ids) = request.change_ids.filter(|ids| !ids.is_empty()) {
        let outcome =
            process_batch_review_action(state.store.as_ref(), document_id, &change_ids, action)
                .await?;
        return Ok(Json(DecideResponse {
            success: true,
            document: outcome.document,
            updated_changes: outcome.changes,
            document_updated: outcome.document_updated,
            all_reviewed: outcome.all_reviewed,
            progress: outcome.progress,
            processed_count: Some(outcome.processed_count),
        }));
    }

    let change_id = request
        .change_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("changeId is required".to_string()))?;

    let outcome =
        process_review_action(state.store.as_ref(), document_id, &change_id, action).await?;
    Ok(Json(DecideResponse {
        success: true,
        document: outcome.document,
        updated_changes: outcome.changes,
        document_updated: outcome.document_updated,
        all_reviewed: outcome.all_reviewed,
        progress: outcome.progress,
        processed_count: None,
    }))
}
