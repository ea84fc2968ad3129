//! # bugtrack-core
//!
//! Core crate for Bugtrack. Contains the storage and session traits,
//! configuration schemas, the acting-user type, pagination types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Bugtrack crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
