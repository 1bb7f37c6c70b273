//! # resolvenow-core
//!
//! Core library for ResolveNow - a local complaint management desk.
//!
//! This library provides:
//! - Domain types for accounts, complaints, and complaint messages
//! - Storage layer holding the two JSON collections in SQLite
//! - Role-based view controllers (customer, agent, admin)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Stores:** `userAccounts` and `complaints`, each a JSON array kept under
//!   its own key. Every write replaces the whole collection.
//! - **Controllers:** per-role views and mutation rules over the stores.
//! - **Presentation:** the `resolvenow` TUI and `resolvenow-cli` binaries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use resolvenow_core::{auth, Config, Database, NewAccount, Role};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&config.database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! auth::sign_up(&db, NewAccount {
//!     name: "Alice".into(),
//!     email: "a@x.com".into(),
//!     password: "pw".into(),
//!     mobile: "555".into(),
//!     role: Role::Customer,
//! }).expect("sign up failed");
//!
//! let user = auth::login(&db, "a@x.com", "pw", Role::Customer).expect("login failed");
//! assert_eq!(user.name, "Alice");
//! ```

// Re-export commonly used items at the crate root
pub use analytics::StatusCounts;
pub use config::Config;
pub use controllers::{AdminController, AgentController, CustomerController, Dashboard, MenuItem};
pub use db::{Database, StoreHealth};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod snapshot;
pub mod types;
