//! Catalog service coordinating the blob store and the metadata index.
//!
//! Owns the consistency contract between a stored blob and its index entry:
//! the blob write always precedes the index insert, so no listable record
//! ever references a blob that failed to persist. The inverse (an orphaned
//! blob with no record) is an accepted degraded state and is always logged
//! with its storage key.

use crate::error::{ApiError, ApiResult};
use bytes::Bytes;
use stacks_core::{derive_storage_key, require_non_empty};
use stacks_metadata::{BookRow, MetadataStore, NewBook};
use stacks_storage::{BlobStore, ByteStream, StorageError};
use std::sync::Arc;
use time::OffsetDateTime;

/// A validated upload request.
#[derive(Debug)]
pub struct UploadRequest {
    pub title: String,
    pub category: String,
    /// Client-supplied filename, used only to derive the storage key.
    pub original_filename: Option<String>,
    pub data: Bytes,
}

/// Catalog of uploaded books.
#[derive(Clone)]
pub struct Catalog {
    storage: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl Catalog {
    pub fn new(storage: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { storage, metadata }
    }

    /// Store a book: blob first, index entry second.
    ///
    /// A storage failure aborts before any index write. An index failure
    /// after a successful blob write leaves an orphaned blob, logged here so
    /// an operator can reconcile; retries are safe because every attempt
    /// derives a fresh key.
    pub async fn upload(&self, req: UploadRequest) -> ApiResult<BookRow> {
        let title = require_non_empty("title", &req.title)?;
        let category = require_non_empty("category", &req.category)?;
        if req.data.is_empty() {
            return Err(stacks_core::Error::EmptyUpload.into());
        }

        let uploaded_at = OffsetDateTime::now_utc();
        let key = derive_storage_key(req.original_filename.as_deref(), uploaded_at);
        let receipt = self.storage.put(&key, req.data).await?;

        let new_book = NewBook {
            title: title.to_string(),
            category: category.to_string(),
            storage_key: receipt.key,
            access_url: receipt.access_url,
            uploaded_at,
        };

        match self.metadata.insert_book(&new_book).await {
            Ok(row) => {
                tracing::info!(
                    id = row.id,
                    storage_key = %row.storage_key,
                    backend = self.storage.backend_name(),
                    "book uploaded"
                );
                Ok(row)
            }
            Err(e) => {
                tracing::warn!(
                    storage_key = %new_book.storage_key,
                    error = %e,
                    "index insert failed after blob write, blob orphaned"
                );
                Err(e.into())
            }
        }
    }

    /// List books, most recently uploaded first, optionally by category.
    pub async fn list(&self, category: Option<&str>) -> ApiResult<Vec<BookRow>> {
        let rows = match category {
            Some(category) if !category.is_empty() => {
                self.metadata.list_books_by_category(category).await?
            }
            _ => self.metadata.list_books().await?,
        };
        Ok(rows)
    }

    /// Open a book for streaming.
    ///
    /// A missing record and a missing blob are distinct failures: the latter
    /// indicates a prior partial failure and is logged as an integrity
    /// warning.
    pub async fn open(&self, id: i64) -> ApiResult<(BookRow, ByteStream)> {
        let book = self
            .metadata
            .get_book(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("book not found: {id}")))?;

        match self.storage.get_stream(&book.storage_key).await {
            Ok(stream) => Ok((book, stream)),
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    id,
                    storage_key = %book.storage_key,
                    "book record references missing blob"
                );
                Err(ApiError::ContentMissing(format!("book {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a book: index record first, blob second.
    ///
    /// Once the record is gone the operation succeeds even if the blob
    /// delete fails; the leaked blob is logged. An index failure leaves the
    /// blob intact, so no record ever references a deleted blob.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let book = self
            .metadata
            .get_book(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("book not found: {id}")))?;

        if !self.metadata.delete_book(id).await? {
            // Lost a race with a concurrent delete.
            return Err(ApiError::NotFound(format!("book not found: {id}")));
        }

        match self.storage.delete(&book.storage_key).await {
            Ok(()) => {
                tracing::info!(id, storage_key = %book.storage_key, "book deleted");
            }
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(id, storage_key = %book.storage_key, "blob already absent on delete");
            }
            Err(e) => {
                tracing::warn!(
                    id,
                    storage_key = %book.storage_key,
                    error = %e,
                    "blob delete failed after record removal, blob orphaned"
                );
            }
        }
        Ok(())
    }
}
