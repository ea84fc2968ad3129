//! # bugtrack-storage
//!
//! Object storage for bug images. Provides the filesystem and in-memory
//! [`ObjectStore`](bugtrack_core::traits::ObjectStore) providers, signed URL
//! issuance, file name sanitization, and the [`BugImageGateway`] that keeps
//! every image under its owner's and bug's prefix.

pub mod gateway;
pub mod naming;
pub mod providers;
pub mod signing;

pub use gateway::{BugImageGateway, CleanupResult};
pub use providers::open_bug_image_store;
pub use signing::UrlSigner;

/// The only bucket bug images are ever written to.
pub const BUG_IMAGES_BUCKET: &str = "bug-images";

/// Top-level folder inside [`BUG_IMAGES_BUCKET`].
pub const BUG_IMAGES_ROOT: &str = "bugs";
