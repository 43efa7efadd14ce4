//! Postgres-backed document store.
//!
//! The review session is denormalized onto the `cv_files` row
//! (`pending_changes` jsonb + `pending_source_version`), matching how the
//! surrounding product stores it; version snapshots live in `cv_versions`
//! and are written by the generation pipeline, never here.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::change::{ChangeRecord, ReviewSession};
use crate::models::document::CvFileRow;
use crate::store::{DocumentRecord, DocumentStore, DocumentWrite, StoreError};

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn load(&self, document_id: Uuid) -> Result<DocumentRecord, StoreError> {
        let row: Option<CvFileRow> = sqlx::query_as("SELECT * FROM cv_files WHERE id = $1")
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or(StoreError::NotFound(document_id))?;

        let session = match (row.pending_changes, row.pending_source_version) {
            (Some(changes), Some(source_version)) => {
                let changes: Vec<ChangeRecord> = serde_json::from_value(changes)
                    .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;
                Some(ReviewSession {
                    document_id: row.id,
                    source_version,
                    changes,
                })
            }
            _ => None,
        };

        Ok(DocumentRecord {
            id: row.id,
            content: row.content,
            session,
            revision: row.revision,
        })
    }

    async fn load_version(
        &self,
        document_id: Uuid,
        version: i32,
    ) -> Result<Option<Value>, StoreError> {
        let content: Option<Value> = sqlx::query_scalar(
            "SELECT content FROM cv_versions WHERE cv_file_id = $1 AND version = $2",
        )
        .bind(document_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(content)
    }

    async fn commit(
        &self,
        document_id: Uuid,
        expected_revision: i64,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        let (pending_changes, pending_source_version) = match &write.session {
            Some(session) => (
                Some(serde_json::to_value(&session.changes).map_err(|e| {
                    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
                })?),
                Some(session.source_version),
            ),
            None => (None, None),
        };

        // Optimistic concurrency: the row must still be at the revision the
        // caller loaded, otherwise another writer got there first.
        let result = sqlx::query(
            r#"
            UPDATE cv_files
            SET content = COALESCE($3, content),
                pending_changes = $4,
                pending_source_version = $5,
                revision = revision + 1,
                updated_at = NOW()
            WHERE id = $1 AND revision = $2
            "#,
        )
        .bind(document_id)
        .bind(expected_revision)
        .bind(write.content)
        .bind(pending_changes)
        .bind(pending_source_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM cv_files WHERE id = $1")
                    .bind(document_id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match exists {
                Some(_) => StoreError::Conflict(document_id),
                None => StoreError::NotFound(document_id),
            });
        }

        info!("Committed document {document_id} at revision {}", expected_revision + 1);
        Ok(())
    }
}
