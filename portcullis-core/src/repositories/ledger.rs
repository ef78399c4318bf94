//! Attempt ledger contract.
//!
//! The ledger is the durable, append-only record of every authentication
//! attempt. The guard writes to it on every decision; the audit queries
//! recompute ban and lock state from it without consulting the fast counter
//! store, which is what makes the report trustworthy when the two have
//! drifted apart.

use async_trait::async_trait;

use crate::{
    Error,
    attempt::{LoginAttempt, NewLoginAttempt},
    user::UserId,
};

/// Durable store of login attempts.
///
/// # Reconciliation rule
///
/// Both audit queries apply the same two-part rule to their key (client
/// address or resolved account):
///
/// 1. A key with no successful attempt ever and at least `threshold`
///    failures is flagged.
/// 2. A key whose most recent success is followed by at least `threshold`
///    failures is flagged.
///
/// The two parts are disjoint by construction (a key either has a success in
/// its history or it does not) and their union is the flagged set.
///
/// Reconciliation reads are fail-hard: a query that cannot complete must
/// return an error rather than a partial result presented as complete.
#[async_trait]
pub trait AttemptLedger: Send + Sync + 'static {
    /// Append one attempt record.
    ///
    /// Returns the stored record with its assigned id. Append failures are
    /// reported to the caller; the guard treats them as best-effort relative
    /// to the authentication outcome, but they must never be silent.
    async fn append(&self, attempt: NewLoginAttempt) -> Result<LoginAttempt, Error>;

    /// Client addresses currently over the ban threshold, per the
    /// reconciliation rule.
    async fn banned_ips(&self, threshold: u32) -> Result<Vec<String>, Error>;

    /// Login names of accounts currently over the lock threshold, per the
    /// reconciliation rule.
    ///
    /// Only attempts that resolved to an account participate; the login name
    /// is taken from the ledger itself, not joined against the user store.
    async fn locked_logins(&self, threshold: u32) -> Result<Vec<String>, Error>;

    /// Most recent successful attempts for an account, newest first.
    ///
    /// Backs the last-login read path: two rows are enough to distinguish
    /// the current login from the one before it.
    async fn recent_successes(&self, user_id: &UserId, limit: u32)
    -> Result<Vec<LoginAttempt>, Error>;
}
