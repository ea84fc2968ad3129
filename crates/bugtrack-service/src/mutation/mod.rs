//! Non-destructive bug mutations paired with audit rows.

pub mod facade;

pub use facade::{MutationFacade, MutationResult};
