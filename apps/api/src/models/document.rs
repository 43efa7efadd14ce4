#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored CV file. `content` is the live document; `pending_changes` and
/// `pending_source_version` hold the review session while one is open.
/// `revision` backs the optimistic concurrency check on every write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvFileRow {
    pub id: Uuid,
    pub content: Value,
    pub pending_changes: Option<Value>,
    pub pending_source_version: Option<i32>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable snapshot of a CV at a given version. Written by the
/// generation pipeline, read here as the diff baseline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvVersionRow {
    pub cv_file_id: Uuid,
    pub version: i32,
    pub content: Value,
    pub created_at: DateTime<Utc>,
}
