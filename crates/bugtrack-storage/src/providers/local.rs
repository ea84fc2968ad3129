//! Local filesystem storage provider.
//!
//! Each bucket is a directory under the configured root; object paths map
//! directly onto relative file paths inside it.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use bugtrack_core::error::{AppError, ErrorKind};
use bugtrack_core::result::AppResult;
use bugtrack_core::traits::ObjectStore;
use bugtrack_core::traits::storage::StorageObjectMeta;

use super::content_type_from_path;
use crate::signing::UrlSigner;

/// Local filesystem storage provider bound to one bucket.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Directory holding this bucket's objects.
    root: PathBuf,
    bucket: String,
    signer: UrlSigner,
}

impl LocalStorageProvider {
    /// Open (creating if needed) `bucket` under `root_path`.
    pub async fn new(root_path: &str, bucket: &str, signer: UrlSigner) -> AppResult<Self> {
        let root = PathBuf::from(root_path).join(bucket);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            bucket: bucket.to_string(),
            signer,
        })
    }

    /// Resolve an object path to a file inside the bucket directory.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid object path: {path}")));
        }
        Ok(self.root.join(clean))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> AppResult<StorageObjectMeta> {
        let full_path = self.resolve(path)?;
        if !upsert && fs::try_exists(&full_path).await.unwrap_or(false) {
            return Err(AppError::conflict(format!("Object already exists: {path}")));
        }
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {path}"),
                e,
            )
        })?;

        debug!(bucket = %self.bucket, path, bytes = data.len(), "Wrote object");
        Ok(StorageObjectMeta {
            path: path.trim_start_matches('/').to_string(),
            size_bytes: data.len() as u64,
            content_type: Some(content_type.to_string()),
            last_modified: Some(chrono::Utc::now()),
        })
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read object: {path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn list(&self, prefix: &str, limit: usize) -> AppResult<Vec<StorageObjectMeta>> {
        let prefix = prefix.trim_matches('/');
        let dir_path = self.resolve(prefix)?;
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&dir_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list prefix: {prefix}"),
                e,
            )
        })?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;
            if !meta.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let path = format!("{prefix}/{name}");
            entries.push(StorageObjectMeta {
                content_type: content_type_from_path(&path),
                path,
                size_bytes: meta.len(),
                last_modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn remove(&self, paths: &[String]) -> AppResult<usize> {
        let mut removed = 0;
        for path in paths {
            let full_path = self.resolve(path)?;
            match fs::remove_file(&full_path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to remove object: {path}"),
                        e,
                    ));
                }
            }
        }
        debug!(bucket = %self.bucket, requested = paths.len(), removed, "Removed objects");
        Ok(removed)
    }

    async fn create_signed_url(&self, path: &str, expires_in: Duration) -> AppResult<String> {
        let full_path = self.resolve(path)?;
        if !full_path.is_file() {
            return Err(AppError::not_found(format!("Object not found: {path}")));
        }
        self.signer.sign(&self.bucket, path, expires_in)
    }
}
