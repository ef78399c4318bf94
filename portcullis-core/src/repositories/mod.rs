//! Repository traits for the data access layer
//!
//! This module defines the interfaces that services use to interact with
//! storage. These traits provide a clean abstraction over the underlying
//! storage implementation.
//!
//! # Trait Hierarchy
//!
//! The repository system uses a composable trait hierarchy:
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*Provider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining the provider traits plus
//!   lifecycle methods
//!
//! The failure counter is deliberately not part of [`RepositoryProvider`]: it
//! is a separate external system (typically a key-value store) with its own
//! lifecycle, injected into services on its own.

pub mod adapter;
pub mod counter;
pub mod ledger;
pub mod user;

pub use adapter::{AttemptLedgerAdapter, UserRepositoryAdapter};
pub use counter::{CounterKey, FailureCounter};
pub use ledger::AttemptLedger;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

// ============================================================================
// Individual Repository Provider Traits
// ============================================================================

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    /// The user repository implementation type
    type UserRepo: UserRepository;

    /// Get the user repository
    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for attempt ledger access.
pub trait AttemptLedgerProvider: Send + Sync + 'static {
    /// The attempt ledger implementation type
    type Ledger: AttemptLedger;

    /// Get the attempt ledger
    fn ledger(&self) -> &Self::Ledger;
}

// ============================================================================
// Unified Repository Provider Trait
// ============================================================================

/// Provider trait that storage backends implement to supply all durable
/// repositories.
///
/// # Implementing a Custom Storage Backend
///
/// To implement a custom storage backend, you need to:
/// 1. Implement each individual `*Repository` trait for your backend
/// 2. Implement each individual `*Provider` trait
/// 3. Implement the `RepositoryProvider` trait with `migrate()` and `health_check()`
#[async_trait]
pub trait RepositoryProvider: UserRepositoryProvider + AttemptLedgerProvider {
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
