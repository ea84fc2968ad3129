//! Object store trait for private, bucket-scoped binary storage.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Full path of the object within its bucket.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

impl StorageObjectMeta {
    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A single private bucket.
///
/// Objects are addressed by `/`-separated paths. The bucket is never
/// publicly readable; read access is granted through signed URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., `"local"`, `"memory"`).
    fn provider_type(&self) -> &str;

    /// Name of the bucket this store is bound to.
    fn bucket(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` at `path`.
    ///
    /// With `upsert` an existing object is replaced; without it an existing
    /// object yields a `Conflict` error.
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> AppResult<StorageObjectMeta>;

    /// Read an object fully into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// List objects directly under `prefix`, at most `limit` of them,
    /// ordered by path. A prefix with no objects yields an empty list.
    async fn list(&self, prefix: &str, limit: usize) -> AppResult<Vec<StorageObjectMeta>>;

    /// Remove all `paths` in one batch call. Missing objects are ignored.
    async fn remove(&self, paths: &[String]) -> AppResult<usize>;

    /// Issue a signed URL granting read access to `path` for `expires_in`.
    async fn create_signed_url(&self, path: &str, expires_in: Duration) -> AppResult<String>;
}
