//! Object store provider implementations.

#[cfg(feature = "local")]
pub mod local;
#[cfg(feature = "memory")]
pub mod memory;

use std::sync::Arc;

use bugtrack_core::config::StorageConfig;
use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;
use bugtrack_core::traits::ObjectStore;

use crate::BUG_IMAGES_BUCKET;
use crate::signing::UrlSigner;

/// Open the bug image bucket on the provider named by `config.provider`.
pub async fn open_bug_image_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let signer = UrlSigner::new(config.signing_secret.clone(), config.public_base_url.clone())?;
    match config.provider.as_str() {
        #[cfg(feature = "local")]
        "local" => {
            let provider =
                local::LocalStorageProvider::new(&config.local.root_path, BUG_IMAGES_BUCKET, signer)
                    .await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "memory")]
        "memory" => Ok(Arc::new(memory::MemoryStorageProvider::new(
            BUG_IMAGES_BUCKET,
            signer,
        ))),
        other => Err(AppError::configuration(format!(
            "Unsupported storage provider: '{other}'"
        ))),
    }
}

/// Whether `path` sits directly under `prefix` (no deeper nesting).
pub(crate) fn is_direct_child(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest
            .strip_prefix('/')
            .is_some_and(|name| !name.is_empty() && !name.contains('/')),
        None => false,
    }
}

/// Guess a content type from an image path extension.
pub(crate) fn content_type_from_path(path: &str) -> Option<String> {
    let ext = path.rsplit('.').next()?.to_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_direct_child() {
        assert!(is_direct_child("bugs/u/b", "bugs/u/b/x.png"));
        assert!(is_direct_child("/bugs/u/b/", "bugs/u/b/x.png"));
        assert!(!is_direct_child("bugs/u/b", "bugs/u/b/nested/x.png"));
        assert!(!is_direct_child("bugs/u/b", "bugs/u/bb/x.png"));
        assert!(!is_direct_child("bugs/u/b", "bugs/u/b"));
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(content_type_from_path("a/b.PNG"), Some("image/png".into()));
        assert_eq!(content_type_from_path("noext"), None);
    }
}
