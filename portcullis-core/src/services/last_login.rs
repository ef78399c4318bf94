//! Cache-first last-login reads.
//!
//! The member page shows "last logged in from ... at ..." on every request,
//! which would otherwise cost a ledger query per page view. This service
//! keeps the two most recent successful logins per account in a
//! [`ShardedCache`] and falls back to the ledger only on a miss.
//!
//! Cache absence never means "never logged in"; it means the entry has not
//! been built yet. Staleness relative to the ledger is tolerated: the entry
//! is advisory and the ledger remains the source of truth.

use std::sync::Arc;

use crate::{
    Error,
    attempt::LastLogin,
    cache::ShardedCache,
    repositories::AttemptLedger,
    user::UserId,
};

/// The two most recent successful logins for one account.
///
/// `previous` is what the member page shows once a user has logged in twice:
/// the login before the one that opened the current session.
#[derive(Debug, Clone)]
pub struct RecentLogins {
    pub current: LastLogin,
    pub previous: Option<LastLogin>,
}

impl RecentLogins {
    /// The login to display: the previous one when it exists, otherwise the
    /// only one on record (a first login shows itself).
    pub fn summary(&self) -> &LastLogin {
        self.previous.as_ref().unwrap_or(&self.current)
    }

    fn roll(&mut self, next: LastLogin) {
        self.previous = Some(std::mem::replace(&mut self.current, next));
    }
}

/// Serves last-login lookups, cache first with ledger fallback.
pub struct LastLoginService<L: AttemptLedger> {
    ledger: Arc<L>,
    cache: ShardedCache<UserId, RecentLogins>,
}

impl<L: AttemptLedger> LastLoginService<L> {
    /// Create a service with the default cache partition count.
    pub fn new(ledger: Arc<L>) -> Self {
        Self::with_shards(ledger, ShardedCache::<UserId, RecentLogins>::DEFAULT_SHARDS)
    }

    /// Create a service with an explicit cache partition count.
    pub fn with_shards(ledger: Arc<L>, shards: usize) -> Self {
        Self {
            ledger,
            cache: ShardedCache::new(shards),
        }
    }

    /// The last login to display for an account.
    ///
    /// Returns `None` for an account with no successful login on record.
    /// Ledger read failures on the fallback path are hard errors; only the
    /// counter store gets fail-open treatment.
    pub async fn last_login(&self, user_id: &UserId) -> Result<Option<LastLogin>, Error> {
        if let Some(entry) = self.cache.get(user_id) {
            return Ok(Some(entry.summary().clone()));
        }

        let successes = self.ledger.recent_successes(user_id, 2).await?;
        let mut logins = successes.iter().filter_map(LastLogin::from_attempt);
        let Some(current) = logins.next() else {
            return Ok(None);
        };
        let previous = logins.next();

        let entry = RecentLogins { current, previous };
        let summary = entry.summary().clone();
        self.cache.set(*user_id, entry);
        Ok(Some(summary))
    }

    /// Roll an account's cache entry forward after a successful login.
    ///
    /// On a cache miss this writes nothing: fabricating an entry here would
    /// make a first read misreport "first login" for an account whose
    /// history simply was not cached. The read path rebuilds from the
    /// ledger instead.
    pub fn push(&self, login: LastLogin) {
        let user_id = login.user_id;
        if let Some(mut entry) = self.cache.get(&user_id) {
            entry.roll(login);
            self.cache.set(user_id, entry);
        }
    }

    /// Drop an account's cache entry, forcing the next read to rebuild.
    pub fn evict(&self, user_id: &UserId) {
        self.cache.delete(user_id);
    }
}
