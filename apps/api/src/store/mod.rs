//! The persistence collaborator contract.
//!
//! The engine itself is pure computation over values; everything durable
//! goes through `DocumentStore`. The store owns the single-writer guarantee:
//! every load carries the document's `revision`, every commit presents it
//! back, and a commit against a moved revision fails with
//! [`StoreError::Conflict`] instead of clobbering a concurrent write.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::change::ReviewSession;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(Uuid),

    #[error("document {0} was modified concurrently")]
    Conflict(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A loaded document with its open review session, if any, and the revision
/// to present on the next commit.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub content: Value,
    pub session: Option<ReviewSession>,
    pub revision: i64,
}

/// One atomic write: optionally replace the live content, and set or clear
/// the review session. `session: None` clears it (all changes reviewed).
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub content: Option<Value>,
    pub session: Option<ReviewSession>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Loads the live document plus any open review session.
    async fn load(&self, document_id: Uuid) -> Result<DocumentRecord, StoreError>;

    /// Loads the immutable content snapshot at `version`, if one exists.
    async fn load_version(
        &self,
        document_id: Uuid,
        version: i32,
    ) -> Result<Option<Value>, StoreError>;

    /// Commits a write observed-at `expected_revision`. Fails with
    /// `Conflict` when the stored revision has moved since the load.
    async fn commit(
        &self,
        document_id: Uuid,
        expected_revision: i64,
        write: DocumentWrite,
    ) -> Result<(), StoreError>;
}
