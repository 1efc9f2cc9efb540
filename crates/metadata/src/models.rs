//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;

/// Book record as stored in the index.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    /// Surrogate id, assigned by the index on insert and never reused.
    pub id: i64,
    pub title: String,
    pub category: String,
    /// Opaque locator resolving the record to its blob.
    pub storage_key: String,
    /// Direct URL to the blob, present for remote backends only.
    pub access_url: Option<String>,
    pub uploaded_at: OffsetDateTime,
}

/// Fields of a book record prior to id assignment.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub category: String,
    pub storage_key: String,
    pub access_url: Option<String>,
    pub uploaded_at: OffsetDateTime,
}
