//! Database layer for ResolveNow
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for the account and complaint collections

pub mod repo;
pub mod schema;

pub use repo::{Database, StoreHealth};
