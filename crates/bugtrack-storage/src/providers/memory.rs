//! In-memory storage provider.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;
use bugtrack_core::traits::ObjectStore;
use bugtrack_core::traits::storage::StorageObjectMeta;

use super::is_direct_child;
use crate::signing::UrlSigner;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Bucket held in a sorted map. Counts remove calls and can be told to
/// fail them.
#[derive(Debug)]
pub struct MemoryStorageProvider {
    bucket: String,
    signer: UrlSigner,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    remove_calls: AtomicUsize,
    fail_remove: AtomicBool,
}

impl MemoryStorageProvider {
    /// Create an empty bucket.
    pub fn new(bucket: &str, signer: UrlSigner) -> Self {
        Self {
            bucket: bucket.to_string(),
            signer,
            objects: RwLock::new(BTreeMap::new()),
            remove_calls: AtomicUsize::new(0),
            fail_remove: AtomicBool::new(false),
        }
    }

    /// Number of `remove` calls received so far.
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `remove` calls fail (or succeed again).
    pub fn set_fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// All stored paths, sorted.
    pub async fn paths(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// The signer used for issued URLs.
    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }
}

#[async_trait]
impl ObjectStore for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> AppResult<StorageObjectMeta> {
        tokio::task::yield_now().await;
        let path = path.trim_start_matches('/').to_string();
        let mut objects = self.objects.write().await;
        if !upsert && objects.contains_key(&path) {
            return Err(AppError::conflict(format!("Object already exists: {path}")));
        }
        let now = Utc::now();
        let size_bytes = data.len() as u64;
        objects.insert(
            path.clone(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: now,
            },
        );
        Ok(StorageObjectMeta {
            path,
            size_bytes,
            content_type: Some(content_type.to_string()),
            last_modified: Some(now),
        })
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.objects
            .read()
            .await
            .get(path.trim_start_matches('/'))
            .map(|o| o.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {path}")))
    }

    async fn list(&self, prefix: &str, limit: usize) -> AppResult<Vec<StorageObjectMeta>> {
        tokio::task::yield_now().await;
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|(path, _)| is_direct_child(prefix, path))
            .take(limit)
            .map(|(path, object)| StorageObjectMeta {
                path: path.clone(),
                size_bytes: object.data.len() as u64,
                content_type: Some(object.content_type.clone()),
                last_modified: Some(object.last_modified),
            })
            .collect())
    }

    async fn remove(&self, paths: &[String]) -> AppResult<usize> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(AppError::storage("Simulated failure in remove"));
        }
        let mut objects = self.objects.write().await;
        Ok(paths
            .iter()
            .filter(|p| objects.remove(p.trim_start_matches('/')).is_some())
            .count())
    }

    async fn create_signed_url(&self, path: &str, expires_in: Duration) -> AppResult<String> {
        if !self
            .objects
            .read()
            .await
            .contains_key(path.trim_start_matches('/'))
        {
            return Err(AppError::not_found(format!("Object not found: {path}")));
        }
        self.signer.sign(&self.bucket, path, expires_in)
    }
}
