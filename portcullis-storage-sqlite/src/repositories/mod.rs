//! Repository implementations for SQLite storage

pub mod ledger;
pub mod user;

pub use ledger::SqliteAttemptLedger;
pub use user::SqliteUserRepository;

use async_trait::async_trait;
use portcullis_core::{
    Error,
    error::StorageError,
    repositories::{AttemptLedgerProvider, RepositoryProvider, UserRepositoryProvider},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository provider implementation for SQLite
///
/// This struct implements the individual repository provider traits as well
/// as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    user: Arc<SqliteUserRepository>,
    ledger: Arc<SqliteAttemptLedger>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let user = Arc::new(SqliteUserRepository::new(pool.clone()));
        let ledger = Arc::new(SqliteAttemptLedger::new(pool.clone()));

        Self { pool, user, ledger }
    }

    /// Connect to a SQLite database and build a provider around the pool.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(Self::new(pool))
    }
}

// Implement individual provider traits

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl AttemptLedgerProvider for SqliteRepositoryProvider {
    type Ledger = SqliteAttemptLedger;

    fn ledger(&self) -> &Self::Ledger {
        &self.ledger
    }
}

// Implement the unified RepositoryProvider trait

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        use crate::migrations::{
            CreateLoginAttemptIndexes, CreateLoginAttemptsTable, CreateUsersTable,
            SqliteMigrationManager,
        };
        use portcullis_migration::{Migration, MigrationManager};

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        let migrations: Vec<Box<dyn Migration<_>>> = vec![
            Box::new(CreateUsersTable),
            Box::new(CreateLoginAttemptsTable),
            Box::new(CreateLoginAttemptIndexes),
        ];
        manager.up(&migrations).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
