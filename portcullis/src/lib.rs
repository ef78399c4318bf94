//! # Portcullis
//!
//! Portcullis is a brute-force guard for login endpoints. It watches every
//! authentication attempt, counts consecutive failures per account and per
//! client address, and drops the gate once a threshold is crossed: a locked
//! account or banned address is rejected before its credentials are even
//! checked.
//!
//! The guard keeps two records of the world:
//! - a fast failure counter (typically Redis) consulted on the hot path
//! - a durable append-only attempt ledger (typically SQLite) that every
//!   decision is written to
//!
//! The two are reconciled by reports: [`Portcullis::report`] recomputes the
//! banned and locked sets purely from the ledger, so operators get a
//! trustworthy answer even after the counter store has been flushed or was
//! down for a while.
//!
//! ## Example
//!
//! ```rust,no_run
//! use portcullis::Portcullis;
//! use portcullis_counter_redis::RedisFailureCounter;
//! use portcullis_storage_sqlite::SqliteRepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!     let counter = Arc::new(
//!         RedisFailureCounter::connect("redis://127.0.0.1:6379")
//!             .await
//!             .unwrap(),
//!     );
//!
//!     let portcullis = Portcullis::new(repositories, counter);
//!     portcullis.migrate().await.unwrap();
//!
//!     let outcome = portcullis
//!         .authenticate("81.33.24.7", "isucon", "donkey")
//!         .await
//!         .unwrap();
//!     println!("granted: {}", outcome.is_granted());
//! }
//! ```
use std::sync::Arc;

use portcullis_core::{
    repositories::{AttemptLedgerAdapter, FailureCounter, RepositoryProvider, UserRepositoryAdapter},
    services::{GuardService, LastLoginService, ReportService, UserService},
};

/// Re-export core types from portcullis_core
///
/// These types are commonly used when working with the Portcullis API.
pub use portcullis_core::{
    Error, GuardConfig, LastLogin, User, UserId, client_addr,
    services::{AuthOutcome, Denial, ReportSnapshot},
};

/// Re-export storage backends
///
/// These implementations are available when the corresponding feature is
/// enabled.
#[cfg(feature = "sqlite")]
pub use portcullis_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "redis-counter")]
pub use portcullis_counter_redis::RedisFailureCounter;

/// The main guard coordinator that manages services and storage.
///
/// `Portcullis` wires the guard, report, and last-login services to a
/// repository provider (durable storage) and a failure counter (fast
/// storage), and exposes the operations a login endpoint needs.
pub struct Portcullis<R, C>
where
    R: RepositoryProvider,
    C: FailureCounter,
{
    repositories: Arc<R>,
    guard_service: Arc<GuardService<UserRepositoryAdapter<R>, AttemptLedgerAdapter<R>, C>>,
    user_service: Arc<UserService<UserRepositoryAdapter<R>>>,
    report_service: Arc<ReportService<AttemptLedgerAdapter<R>>>,
    last_login_service: Arc<LastLoginService<AttemptLedgerAdapter<R>>>,
    config: GuardConfig,
}

impl<R, C> Portcullis<R, C>
where
    R: RepositoryProvider,
    C: FailureCounter,
{
    /// Create a new Portcullis instance with the default thresholds.
    pub fn new(repositories: Arc<R>, counter: Arc<C>) -> Self {
        Self::with_config(repositories, counter, GuardConfig::default())
    }

    /// Create a new Portcullis instance with explicit thresholds.
    pub fn with_config(repositories: Arc<R>, counter: Arc<C>, config: GuardConfig) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let ledger = Arc::new(AttemptLedgerAdapter::new(repositories.clone()));

        let user_service = Arc::new(UserService::new(user_repo.clone()));
        let last_login_service = Arc::new(LastLoginService::new(ledger.clone()));
        let report_service = Arc::new(ReportService::new(ledger.clone(), config));
        let guard_service = Arc::new(GuardService::new(
            user_repo,
            ledger,
            counter,
            last_login_service.clone(),
            config,
        ));

        Self {
            repositories,
            guard_service,
            user_service,
            report_service,
            last_login_service,
            config,
        }
    }

    /// Create a new Portcullis instance with thresholds read from the
    /// environment (`PORTCULLIS_USER_LOCK_THRESHOLD`,
    /// `PORTCULLIS_IP_BAN_THRESHOLD`).
    pub fn from_env(repositories: Arc<R>, counter: Arc<C>) -> Result<Self, Error> {
        let config = GuardConfig::from_env()?;
        Ok(Self::with_config(repositories, counter, config))
    }

    /// The thresholds in force.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Run one authentication attempt through the guard.
    ///
    /// `ip` is the already-resolved client address; put [`client_addr`] in
    /// front when the app sits behind a proxy. Rejections come back as
    /// [`AuthOutcome::Denied`], not as errors; the attempt is recorded
    /// either way.
    pub async fn authenticate(
        &self,
        ip: &str,
        login: &str,
        password: &str,
    ) -> Result<AuthOutcome, Error> {
        self.guard_service.authenticate(ip, login, password).await
    }

    /// The last login to display for an account: the success before the
    /// current one when there is one, otherwise the current.
    pub async fn last_login(&self, user_id: &UserId) -> Result<Option<LastLogin>, Error> {
        self.last_login_service.last_login(user_id).await
    }

    /// Recompute the banned addresses and locked accounts from the ledger.
    pub async fn report(&self) -> Result<ReportSnapshot, Error> {
        self.report_service.snapshot().await
    }

    /// Create a new account
    pub async fn create_user(&self, login: &str, password: &str) -> Result<User, Error> {
        self.user_service.create_user(login, password).await
    }

    /// Get an account by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.user_service.get_user(user_id).await
    }

    /// Get an account by login name
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, Error> {
        self.user_service.get_user_by_login(login).await
    }
}
