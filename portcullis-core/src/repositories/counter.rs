//! Failure counter contract.
//!
//! The counter store is the guard's fast path: a mutable key-to-integer map
//! tracking consecutive failures since the last success for each account and
//! each client address. It is volatile relative to the attempt ledger; the
//! audit queries exist to recompute the same state durably.

use std::fmt;

use async_trait::async_trait;

use crate::{Error, user::UserId};

/// Key of a failure counter: one per account, one per client address.
///
/// Account and address counters are independent; a single attempt updates
/// both (when the login resolved to an account) or just the address counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKey {
    User(UserId),
    Ip(String),
}

impl CounterKey {
    pub fn user(id: UserId) -> Self {
        CounterKey::User(id)
    }

    pub fn ip(addr: impl Into<String>) -> Self {
        CounterKey::Ip(addr.into())
    }
}

impl fmt::Display for CounterKey {
    /// Namespaced rendering used by key-value backends: `user:<id>` and
    /// `ip:<addr>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterKey::User(id) => write!(f, "user:{id}"),
            CounterKey::Ip(addr) => write!(f, "ip:{addr}"),
        }
    }
}

/// Store for consecutive-failure counters.
///
/// Implementations must make [`record_failure`](Self::record_failure) atomic
/// per key: two racing failures may interleave with reads in either order,
/// but an increment must never be lost. No atomicity is required across
/// keys, and none ties the counter to the attempt ledger.
#[async_trait]
pub trait FailureCounter: Send + Sync + 'static {
    /// Reset a key after a successful attempt.
    ///
    /// Deletes the counter entirely. Resetting a key that has no counter is
    /// a no-op, not an error.
    async fn record_success(&self, key: &CounterKey) -> Result<(), Error>;

    /// Atomically increment a key's failure count by one.
    ///
    /// Returns the count after the increment. A key with no counter starts
    /// from zero.
    async fn record_failure(&self, key: &CounterKey) -> Result<u64, Error>;

    /// Read a key's current failure count.
    ///
    /// Returns `None` when the key has no counter, either because it never
    /// failed or because the last attempt succeeded.
    async fn read(&self, key: &CounterKey) -> Result<Option<u64>, Error>;
}
