//! SQLite storage backend for the portcullis login guard
//!
//! Implements the durable side of the guard on a single SQLite database:
//! the user accounts table and the append-only login attempts ledger,
//! including the reconciliation queries that recompute ban and lock state
//! from attempt history. The failure counter lives elsewhere; this crate
//! only covers what must survive a restart.

pub mod migrations;
pub mod repositories;

pub use migrations::SqliteMigrationManager;
pub use repositories::{SqliteAttemptLedger, SqliteRepositoryProvider, SqliteUserRepository};
