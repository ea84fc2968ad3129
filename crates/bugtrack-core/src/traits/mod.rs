//! Core traits defined in `bugtrack-core` and implemented by other crates.

pub mod session;
pub mod storage;

pub use session::{SessionProvider, StaticSession};
pub use storage::ObjectStore;
