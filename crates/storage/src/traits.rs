//! Blob store trait definition.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Confirmation returned by a successful `put`.
#[derive(Clone, Debug)]
pub struct PutReceipt {
    /// The key under which the blob was stored.
    pub key: String,
    /// Direct public URL to the blob, if the backend provides one.
    pub access_url: Option<String>,
}

/// Uniform contract both blob backends satisfy.
///
/// `put` must be atomic: a failed write leaves no partially visible blob, so
/// callers can retry with a fresh key. `delete` of an absent key returns
/// `NotFound` on backends that can detect it; callers treat that as
/// idempotent success.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store a blob under the given key.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<PutReceipt>;

    /// Fetch a blob's full content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Fetch a blob as a byte stream.
    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete a blob.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Static identifier for the backend type, used in logging.
    fn backend_name(&self) -> &'static str;

    /// Verify backend reachability at startup.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
