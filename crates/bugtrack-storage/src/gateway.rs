//! Per-bug image storage.
//!
//! Every image lives at `bugs/{owner_id}/{bug_id}/{title}-{reporter}.png`
//! in the private [`BUG_IMAGES_BUCKET`]. Uploads take the owner id from the
//! signed-in session, never from the caller.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bugtrack_core::config::StorageConfig;
use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;
use bugtrack_core::traits::{ObjectStore, SessionProvider};

use crate::naming::image_file_name;
use crate::{BUG_IMAGES_BUCKET, BUG_IMAGES_ROOT};

const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Outcome of a best-effort image cleanup. Never surfaced as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupResult {
    /// Whether every matched object was removed.
    pub success: bool,
    /// Failure description, when `success` is false.
    pub error: Option<String>,
    /// Number of objects the store reported as removed.
    pub removed: usize,
}

impl CleanupResult {
    fn ok(removed: usize) -> Self {
        Self {
            success: true,
            error: None,
            removed,
        }
    }

    fn failed(message: impl Into<String>, removed: usize) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            removed,
        }
    }
}

/// Gateway for bug image upload, listing, preview, and cleanup.
#[derive(Debug, Clone)]
pub struct BugImageGateway {
    store: Arc<dyn ObjectStore>,
    session: Arc<dyn SessionProvider>,
    url_ttl: Duration,
    list_limit: usize,
    max_segment_len: usize,
}

impl BugImageGateway {
    /// Create a gateway. `store` must be bound to [`BUG_IMAGES_BUCKET`].
    pub fn new(
        store: Arc<dyn ObjectStore>,
        session: Arc<dyn SessionProvider>,
        config: &StorageConfig,
    ) -> AppResult<Self> {
        if store.bucket() != BUG_IMAGES_BUCKET {
            return Err(AppError::configuration(format!(
                "Bug images must use bucket '{BUG_IMAGES_BUCKET}', got '{}'",
                store.bucket()
            )));
        }
        Ok(Self {
            store,
            session,
            url_ttl: Duration::from_secs(config.signed_url_ttl_seconds),
            list_limit: config.list_limit,
            max_segment_len: config.max_name_segment_len,
        })
    }

    /// Folder holding every image of one bug.
    pub fn bug_prefix(owner_id: Uuid, bug_id: Uuid) -> String {
        format!("{BUG_IMAGES_ROOT}/{owner_id}/{bug_id}")
    }

    /// Upload `file` for `bug_id` and return a long-lived signed URL.
    ///
    /// Re-uploading with the same title and reporter replaces the existing
    /// object. Every failure is returned; nothing falls back silently.
    pub async fn upload_bug_image(
        &self,
        file: Bytes,
        bug_id: Uuid,
        title: &str,
        reporter: &str,
    ) -> AppResult<String> {
        if file.is_empty() {
            return Err(AppError::validation("Image file is required"));
        }
        if bug_id.is_nil() {
            return Err(AppError::validation("Bug id is required"));
        }
        if title.trim().is_empty() {
            return Err(AppError::validation("Bug title is required"));
        }
        if reporter.trim().is_empty() {
            return Err(AppError::validation("Reporter name is required"));
        }

        let file_name = image_file_name(title, reporter, self.max_segment_len)?;
        let user = self
            .session
            .current_actor()
            .await?
            .ok_or_else(|| AppError::authentication("Sign in to upload images"))?;

        let path = format!("{}/{file_name}", Self::bug_prefix(user.id, bug_id));
        self.store
            .upload(&path, file, IMAGE_CONTENT_TYPE, true)
            .await?;
        let url = self.store.create_signed_url(&path, self.url_ttl).await?;

        info!(bug_id = %bug_id, owner_id = %user.id, path = %path, "Uploaded bug image");
        Ok(url)
    }

    /// Signed URLs for every image of a bug. No images is an empty list.
    pub async fn list_bug_images(&self, owner_id: Uuid, bug_id: Uuid) -> AppResult<Vec<String>> {
        let objects = self
            .store
            .list(&Self::bug_prefix(owner_id, bug_id), self.list_limit)
            .await?;

        let mut urls = Vec::with_capacity(objects.len());
        for object in &objects {
            urls.push(self.store.create_signed_url(&object.path, self.url_ttl).await?);
        }
        Ok(urls)
    }

    /// Signed URL of the first image of a bug, if it has any.
    pub async fn get_bug_preview_image(
        &self,
        owner_id: Uuid,
        bug_id: Uuid,
    ) -> AppResult<Option<String>> {
        Ok(self.list_bug_images(owner_id, bug_id).await?.into_iter().next())
    }

    /// Remove every image of a bug, one remove call per listed batch.
    ///
    /// Batches are listed until a listing comes back shorter than the list
    /// limit. With no images no remove call is issued. Failures are
    /// captured in the returned [`CleanupResult`].
    pub async fn delete_bug_images(&self, owner_id: Uuid, bug_id: Uuid) -> CleanupResult {
        let prefix = Self::bug_prefix(owner_id, bug_id);
        let limit = self.list_limit.max(1);
        let mut removed = 0;

        loop {
            let objects = match self.store.list(&prefix, limit).await {
                Ok(objects) => objects,
                Err(e) => {
                    warn!(bug_id = %bug_id, error = %e, "Failed to list bug images for cleanup");
                    return CleanupResult::failed(e.message, removed);
                }
            };
            if objects.is_empty() {
                break;
            }

            let listed = objects.len();
            let paths: Vec<String> = objects.into_iter().map(|o| o.path).collect();
            let batch = match self.store.remove(&paths).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(bug_id = %bug_id, error = %e, "Failed to remove bug images");
                    return CleanupResult::failed(e.message, removed);
                }
            };
            removed += batch;

            if listed < limit {
                break;
            }
            if batch == 0 {
                warn!(bug_id = %bug_id, listed, "Bug images survived a remove pass");
                return CleanupResult::failed(
                    format!("{listed} images under {prefix} could not be removed"),
                    removed,
                );
            }
        }

        if removed == 0 {
            debug!(bug_id = %bug_id, "No bug images to clean up");
        } else {
            info!(bug_id = %bug_id, removed, "Removed bug images");
        }
        CleanupResult::ok(removed)
    }
}
