#![allow(dead_code)]

//! In-memory document store for tests.
//!
//! Honors the same contract as the Postgres backend: loads report a
//! revision, commits check it, and a stale commit fails with `Conflict`.
//! The mutex serializes writers the way the database row lock would.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::change::ReviewSession;
use crate::store::{DocumentRecord, DocumentStore, DocumentWrite, StoreError};

#[derive(Debug, Clone)]
struct StoredDocument {
    content: Value,
    versions: HashMap<i32, Value>,
    session: Option<ReviewSession>,
    revision: i64,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<Uuid, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a live document.
    pub async fn insert_document(&self, document_id: Uuid, content: Value) {
        self.documents.lock().await.insert(
            document_id,
            StoredDocument {
                content,
                versions: HashMap::new(),
                session: None,
                revision: 0,
            },
        );
    }

    /// Seeds a content snapshot at `version`.
    pub async fn insert_version(&self, document_id: Uuid, version: i32, content: Value) {
        if let Some(doc) = self.documents.lock().await.get_mut(&document_id) {
            doc.versions.insert(version, content);
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load(&self, document_id: Uuid) -> Result<DocumentRecord, StoreError> {
        let documents = self.documents.lock().await;
        let doc = documents
            .get(&document_id)
            .ok_or(StoreError::NotFound(document_id))?;
        Ok(DocumentRecord {
            id: document_id,
            content: doc.content.clone(),
            session: doc.session.clone(),
            revision: doc.revision,
        })
    }

    async fn load_version(
        &self,
        document_id: Uuid,
        version: i32,
    ) -> Result<Option<Value>, StoreError> {
        let documents = self.documents.lock().await;
        let doc = documents
            .get(&document_id)
            .ok_or(StoreError::NotFound(document_id))?;
        Ok(doc.versions.get(&version).cloned())
    }

    async fn commit(
        &self,
        document_id: Uuid,
        expected_revision: i64,
        write: DocumentWrite,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;
        let doc = documents
            .get_mut(&document_id)
            .ok_or(StoreError::NotFound(document_id))?;
        if doc.revision != expected_revision {
            return Err(StoreError::Conflict(document_id));
        }
        if let Some(content) = write.content {
            doc.content = content;
        }
        doc.session = write.session;
        doc.revision += 1;
        Ok(())
    }
}
