//! # bugtrack-entity
//!
//! Domain entity models for Bugtrack. Every struct in this crate is either
//! a database row (deriving `sqlx::FromRow`) or an insert payload for one.
//! Audit actions are a closed set of enums so that the shape of an audit
//! row is fixed by the type system.

pub mod activity;
pub mod bug;
pub mod deleted;
