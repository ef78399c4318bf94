//! The authentication guard.
//!
//! [`GuardService`] runs every login attempt through a fixed evaluation
//! order, short-circuiting on the first rejection:
//!
//! 1. Resolve the submitted login against the user store
//! 2. Address over the ban threshold → [`Denial::BannedIp`]
//! 3. Resolved account over the lock threshold → [`Denial::LockedUser`]
//! 4. No account resolved → [`Denial::UserNotFound`]
//! 5. Credential digest mismatch → [`Denial::WrongPassword`]
//! 6. Otherwise the attempt is granted
//!
//! A banned address is rejected before credentials are ever checked, so the
//! guard leaks nothing about the account to a banned client.
//!
//! Once an outcome is reached, finalization always runs: one ledger append
//! and one counter update per involved key, success resetting and failure
//! incrementing. Rejected attempts count as failures too, including the
//! ban and lock rejections themselves; once a threshold is crossed the
//! counters only grow until a successful attempt resets them.
//!
//! Rejections are ordinary values ([`AuthOutcome::Denied`]), never errors.
//! Counter failures are absorbed: unreadable counters fail open (the
//! attempt proceeds as if unconstrained) and failed counter or ledger
//! writes are logged without changing the decided outcome. Only a user
//! store failure during resolution propagates, because no outcome was
//! reached for finalization to apply to.

use std::sync::Arc;

use crate::{
    Error,
    attempt::{LastLogin, NewLoginAttempt},
    config::GuardConfig,
    repositories::{AttemptLedger, CounterKey, FailureCounter, UserRepository},
    services::LastLoginService,
    user::User,
};

/// Why an attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The client address is over the ban threshold.
    BannedIp,
    /// The account is over the lock threshold.
    LockedUser,
    /// The submitted login matches no account.
    UserNotFound,
    /// The password does not match the account's digest.
    WrongPassword,
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Denial::BannedIp => "banned ip",
            Denial::LockedUser => "locked user",
            Denial::UserNotFound => "user not found",
            Denial::WrongPassword => "wrong password",
        };
        write!(f, "{reason}")
    }
}

/// The outcome of an authentication attempt.
///
/// Denials carry the resolved account when one exists, so callers can log or
/// render account context without a second lookup.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Granted(User),
    Denied {
        user: Option<User>,
        reason: Denial,
    },
}

impl AuthOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthOutcome::Granted(_))
    }

    /// The denial reason, if the attempt was rejected.
    pub fn denial(&self) -> Option<Denial> {
        match self {
            AuthOutcome::Granted(_) => None,
            AuthOutcome::Denied { reason, .. } => Some(*reason),
        }
    }
}

/// Service that decides and records every authentication attempt.
///
/// # Thread Safety
///
/// The service is shared across request tasks; it holds no mutable state of
/// its own. Attempts are not serialized against each other: two racing
/// failures may both read a pre-increment count and slip past a threshold
/// one attempt later than a serial execution would. The lock reliably
/// engages once a subsequent attempt observes the updated counter.
pub struct GuardService<U, L, C>
where
    U: UserRepository,
    L: AttemptLedger,
    C: FailureCounter,
{
    users: Arc<U>,
    ledger: Arc<L>,
    counter: Arc<C>,
    last_logins: Arc<LastLoginService<L>>,
    config: GuardConfig,
}

impl<U, L, C> GuardService<U, L, C>
where
    U: UserRepository,
    L: AttemptLedger,
    C: FailureCounter,
{
    pub fn new(
        users: Arc<U>,
        ledger: Arc<L>,
        counter: Arc<C>,
        last_logins: Arc<LastLoginService<L>>,
        config: GuardConfig,
    ) -> Self {
        Self {
            users,
            ledger,
            counter,
            last_logins,
            config,
        }
    }

    /// The thresholds in force.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Run one authentication attempt.
    ///
    /// `ip` is the already-resolved client address (see
    /// [`client_addr`](crate::attempt::client_addr)); `login` and `password`
    /// are the submitted credentials.
    pub async fn authenticate(
        &self,
        ip: &str,
        login: &str,
        password: &str,
    ) -> Result<AuthOutcome, Error> {
        let user = self.users.find_by_login(login).await?;

        let outcome = self.evaluate(ip, user, password).await;
        self.finalize(ip, login, &outcome).await;
        Ok(outcome)
    }

    async fn evaluate(&self, ip: &str, user: Option<User>, password: &str) -> AuthOutcome {
        let ip_failures = self.failures(&CounterKey::ip(ip)).await;
        if ip_failures.is_some_and(|n| n >= u64::from(self.config.ip_ban_threshold)) {
            return AuthOutcome::Denied {
                user,
                reason: Denial::BannedIp,
            };
        }

        if let Some(user) = &user {
            let user_failures = self.failures(&CounterKey::user(user.id)).await;
            if user_failures.is_some_and(|n| n >= u64::from(self.config.user_lock_threshold)) {
                return AuthOutcome::Denied {
                    user: Some(user.clone()),
                    reason: Denial::LockedUser,
                };
            }
        }

        let Some(user) = user else {
            return AuthOutcome::Denied {
                user: None,
                reason: Denial::UserNotFound,
            };
        };

        if !user.verify_password(password) {
            return AuthOutcome::Denied {
                user: Some(user),
                reason: Denial::WrongPassword,
            };
        }

        AuthOutcome::Granted(user)
    }

    /// Read a failure counter, failing open.
    ///
    /// An unreadable counter is treated as absent: the attempt proceeds as
    /// if the key had never failed. Availability of login wins over strict
    /// lockout when the counter store is down.
    async fn failures(&self, key: &CounterKey) -> Option<u64> {
        match self.counter.read(key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "counter read failed, proceeding without it");
                None
            }
        }
    }

    /// Record the outcome in the counter store and the ledger.
    ///
    /// Both writes are best-effort relative to the already-decided outcome:
    /// a durability failure must not turn a granted login into a denial, or
    /// the other way around.
    async fn finalize(&self, ip: &str, login: &str, outcome: &AuthOutcome) {
        let (user, succeeded) = match outcome {
            AuthOutcome::Granted(user) => (Some(user), true),
            AuthOutcome::Denied { user, .. } => (user.as_ref(), false),
        };

        if let Some(user) = user {
            self.update_counter(&CounterKey::user(user.id), succeeded).await;
        }
        self.update_counter(&CounterKey::ip(ip), succeeded).await;

        let attempt = NewLoginAttempt::new(ip, login, user.map(|u| u.id), succeeded);
        let last_login = user.filter(|_| succeeded).map(|user| LastLogin {
            user_id: user.id,
            login: attempt.login.clone(),
            ip: attempt.ip.clone(),
            at: attempt.created_at,
        });

        // The cache push does not depend on the append landing: the cache
        // serves the attempt we just decided, the ledger catches up on the
        // next read-through.
        if let Err(e) = self.ledger.append(attempt).await {
            tracing::error!(error = %e, login = %login, "failed to append login attempt");
        }

        if let Some(last_login) = last_login {
            self.last_logins.push(last_login);
        }
    }

    async fn update_counter(&self, key: &CounterKey, succeeded: bool) {
        let result = if succeeded {
            self.counter.record_success(key).await
        } else {
            self.counter.record_failure(key).await.map(|_| ())
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, key = %key, "counter update failed, keeping decided outcome");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::LoginAttempt;
    use crate::error::{CounterError, StorageError};
    use crate::repositories::{AttemptLedger, UserRepository};
    use crate::user::{NewUser, UserId};
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockUserRepository {
        users: Mutex<HashMap<i64, User>>,
    }

    impl MockUserRepository {
        fn empty() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }

        /// Repository pre-seeded with a single account at id 1.
        fn with_user(login: &str, password: &str) -> Self {
            let repo = Self::empty();
            let new_user = NewUser::with_password(login, password);
            repo.users.lock().unwrap().insert(
                1,
                User {
                    id: UserId::new(1),
                    login: new_user.login,
                    password_hash: new_user.password_hash,
                    salt: new_user.salt,
                },
            );
            repo
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn create(&self, _user: NewUser) -> Result<User, Error> {
            unreachable!("guard never creates accounts")
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
            Ok(self.users.lock().unwrap().get(&id.as_i64()).cloned())
        }

        async fn find_by_login(&self, login: &str) -> Result<Option<User>, Error> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.login == login)
                .cloned())
        }
    }

    struct FailingUserRepository;

    #[async_trait]
    impl UserRepository for FailingUserRepository {
        async fn create(&self, _user: NewUser) -> Result<User, Error> {
            unreachable!("guard never creates accounts")
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, Error> {
            Err(StorageError::Database("connection reset".to_string()).into())
        }

        async fn find_by_login(&self, _login: &str) -> Result<Option<User>, Error> {
            Err(StorageError::Database("connection reset".to_string()).into())
        }
    }

    /// In-memory ledger that assigns ids in append order.
    struct MockLedger {
        rows: Mutex<Vec<LoginAttempt>>,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn rows(&self) -> Vec<LoginAttempt> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AttemptLedger for MockLedger {
        async fn append(&self, attempt: NewLoginAttempt) -> Result<LoginAttempt, Error> {
            let mut rows = self.rows.lock().unwrap();
            let stored = LoginAttempt {
                id: rows.len() as i64 + 1,
                created_at: attempt.created_at,
                user_id: attempt.user_id,
                login: attempt.login,
                ip: attempt.ip,
                succeeded: attempt.succeeded,
            };
            rows.push(stored.clone());
            Ok(stored)
        }

        async fn banned_ips(&self, _threshold: u32) -> Result<Vec<String>, Error> {
            unreachable!("the guard enforces from counters, not audit queries")
        }

        async fn locked_logins(&self, _threshold: u32) -> Result<Vec<String>, Error> {
            unreachable!("the guard enforces from counters, not audit queries")
        }

        async fn recent_successes(
            &self,
            user_id: &UserId,
            limit: u32,
        ) -> Result<Vec<LoginAttempt>, Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .rev()
                .filter(|a| a.succeeded && a.user_id == Some(*user_id))
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    struct FailingLedger;

    #[async_trait]
    impl AttemptLedger for FailingLedger {
        async fn append(&self, _attempt: NewLoginAttempt) -> Result<LoginAttempt, Error> {
            Err(StorageError::Database("disk full".to_string()).into())
        }

        async fn banned_ips(&self, _threshold: u32) -> Result<Vec<String>, Error> {
            Err(StorageError::Database("disk full".to_string()).into())
        }

        async fn locked_logins(&self, _threshold: u32) -> Result<Vec<String>, Error> {
            Err(StorageError::Database("disk full".to_string()).into())
        }

        async fn recent_successes(
            &self,
            _user_id: &UserId,
            _limit: u32,
        ) -> Result<Vec<LoginAttempt>, Error> {
            Err(StorageError::Database("disk full".to_string()).into())
        }
    }

    struct MockCounter {
        counts: DashMap<String, u64>,
    }

    impl MockCounter {
        fn new() -> Self {
            Self {
                counts: DashMap::new(),
            }
        }

        fn key_count(&self) -> usize {
            self.counts.len()
        }
    }

    #[async_trait]
    impl FailureCounter for MockCounter {
        async fn record_success(&self, key: &CounterKey) -> Result<(), Error> {
            self.counts.remove(&key.to_string());
            Ok(())
        }

        async fn record_failure(&self, key: &CounterKey) -> Result<u64, Error> {
            let mut entry = self.counts.entry(key.to_string()).or_insert(0);
            *entry += 1;
            Ok(*entry)
        }

        async fn read(&self, key: &CounterKey) -> Result<Option<u64>, Error> {
            Ok(self.counts.get(&key.to_string()).map(|v| *v))
        }
    }

    struct UnavailableCounter;

    #[async_trait]
    impl FailureCounter for UnavailableCounter {
        async fn record_success(&self, _key: &CounterKey) -> Result<(), Error> {
            Err(CounterError::Unavailable("connection refused".to_string()).into())
        }

        async fn record_failure(&self, _key: &CounterKey) -> Result<u64, Error> {
            Err(CounterError::Unavailable("connection refused".to_string()).into())
        }

        async fn read(&self, _key: &CounterKey) -> Result<Option<u64>, Error> {
            Err(CounterError::Unavailable("connection refused".to_string()).into())
        }
    }

    fn guard<U, L, C>(
        users: Arc<U>,
        ledger: Arc<L>,
        counter: Arc<C>,
        config: GuardConfig,
    ) -> GuardService<U, L, C>
    where
        U: UserRepository,
        L: AttemptLedger,
        C: FailureCounter,
    {
        let last_logins = Arc::new(LastLoginService::new(ledger.clone()));
        GuardService::new(users, ledger, counter, last_logins, config)
    }

    #[tokio::test]
    async fn test_correct_credentials_granted_and_recorded() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        let user = match outcome {
            AuthOutcome::Granted(user) => user,
            other => panic!("expected grant, got {other:?}"),
        };
        assert_eq!(user.login, "isucon");

        let rows = ledger.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].succeeded);
        assert_eq!(rows[0].user_id, Some(UserId::new(1)));
        assert_eq!(rows[0].ip, "81.33.24.7");
    }

    #[tokio::test]
    async fn test_wrong_password_denied_and_counted() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "monkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::WrongPassword));

        // Both the account and the address counted the failure.
        let user_key = CounterKey::user(UserId::new(1));
        let ip_key = CounterKey::ip("81.33.24.7");
        assert_eq!(counter.read(&user_key).await.unwrap(), Some(1));
        assert_eq!(counter.read(&ip_key).await.unwrap(), Some(1));

        let rows = ledger.rows();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].succeeded);
        assert_eq!(rows[0].user_id, Some(UserId::new(1)));
    }

    #[tokio::test]
    async fn test_unknown_login_counts_address_only() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        let outcome = service
            .authenticate("81.33.24.7", "phantom", "donkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::UserNotFound));

        assert_eq!(
            counter.read(&CounterKey::ip("81.33.24.7")).await.unwrap(),
            Some(1)
        );
        assert_eq!(counter.key_count(), 1);

        // The submitted name is kept in the record even though it resolved
        // to nothing.
        let rows = ledger.rows();
        assert_eq!(rows[0].user_id, None);
        assert_eq!(rows[0].login, "phantom");
    }

    #[tokio::test]
    async fn test_success_resets_failure_counters() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        for _ in 0..2 {
            service
                .authenticate("81.33.24.7", "isucon", "monkey")
                .await
                .unwrap();
        }
        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert!(outcome.is_granted());

        let user_key = CounterKey::user(UserId::new(1));
        let ip_key = CounterKey::ip("81.33.24.7");
        assert_eq!(counter.read(&user_key).await.unwrap(), None);
        assert_eq!(counter.read(&ip_key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_account_locks_at_threshold_even_with_correct_password() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        for _ in 0..3 {
            let outcome = service
                .authenticate("81.33.24.7", "isucon", "monkey")
                .await
                .unwrap();
            assert_eq!(outcome.denial(), Some(Denial::WrongPassword));
        }

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::LockedUser));

        // The lock rejection itself counted as a failure.
        let user_key = CounterKey::user(UserId::new(1));
        assert_eq!(counter.read(&user_key).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_address_bans_at_threshold_even_with_correct_password() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig {
                user_lock_threshold: 100,
                ip_ban_threshold: 10,
            },
        );

        for _ in 0..10 {
            service
                .authenticate("81.33.24.7", "phantom", "x")
                .await
                .unwrap();
        }

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::BannedIp));
        // The account context still resolved for the caller's benefit.
        let AuthOutcome::Denied { user, .. } = outcome else {
            unreachable!()
        };
        assert_eq!(user.unwrap().login, "isucon");

        assert_eq!(
            counter.read(&CounterKey::ip("81.33.24.7")).await.unwrap(),
            Some(11)
        );
    }

    #[tokio::test]
    async fn test_ban_is_checked_before_lock() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig {
                user_lock_threshold: 1,
                ip_ban_threshold: 1,
            },
        );

        service
            .authenticate("81.33.24.7", "isucon", "monkey")
            .await
            .unwrap();

        // Both thresholds are now crossed; the address ban wins.
        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::BannedIp));
    }

    #[tokio::test]
    async fn test_unresolved_failures_do_not_lock_the_account() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        // Mistyped login names hit the address counter, not the account's.
        for _ in 0..3 {
            service
                .authenticate("81.33.24.7", "isucon2", "donkey")
                .await
                .unwrap();
        }

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert!(outcome.is_granted());
    }

    #[tokio::test]
    async fn test_denied_attempts_keep_counting() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        for _ in 0..3 {
            service
                .authenticate("81.33.24.7", "isucon", "monkey")
                .await
                .unwrap();
        }
        for _ in 0..2 {
            let outcome = service
                .authenticate("81.33.24.7", "isucon", "monkey")
                .await
                .unwrap();
            assert_eq!(outcome.denial(), Some(Denial::LockedUser));
        }

        let user_key = CounterKey::user(UserId::new(1));
        assert_eq!(counter.read(&user_key).await.unwrap(), Some(5));
        assert_eq!(ledger.rows().len(), 5);
    }

    #[tokio::test]
    async fn test_counter_outage_fails_open() {
        let ledger = Arc::new(MockLedger::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            ledger.clone(),
            Arc::new(UnavailableCounter),
            GuardConfig::default(),
        );

        // No counter, no enforcement: credentials alone decide.
        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert!(outcome.is_granted());

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "monkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::WrongPassword));

        // The durable record is still written.
        assert_eq!(ledger.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_outage_keeps_the_decided_outcome() {
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(MockUserRepository::with_user("isucon", "donkey")),
            Arc::new(FailingLedger),
            counter.clone(),
            GuardConfig::default(),
        );

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap();
        assert!(outcome.is_granted());

        let outcome = service
            .authenticate("81.33.24.7", "isucon", "monkey")
            .await
            .unwrap();
        assert_eq!(outcome.denial(), Some(Denial::WrongPassword));
        assert_eq!(
            counter
                .read(&CounterKey::user(UserId::new(1)))
                .await
                .unwrap(),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_user_store_failure_propagates_without_recording() {
        let ledger = Arc::new(MockLedger::new());
        let counter = Arc::new(MockCounter::new());
        let service = guard(
            Arc::new(FailingUserRepository),
            ledger.clone(),
            counter.clone(),
            GuardConfig::default(),
        );

        let err = service
            .authenticate("81.33.24.7", "isucon", "donkey")
            .await
            .unwrap_err();
        assert!(err.is_storage_error());

        // No outcome was reached, so nothing was recorded anywhere.
        assert!(ledger.rows().is_empty());
        assert_eq!(counter.key_count(), 0);
    }

    #[tokio::test]
    async fn test_granted_login_rolls_the_last_login_cache() {
        let users = Arc::new(MockUserRepository::with_user("isucon", "donkey"));
        let ledger = Arc::new(MockLedger::new());
        let last_logins = Arc::new(LastLoginService::new(ledger.clone()));
        let service = GuardService::new(
            users,
            ledger.clone(),
            Arc::new(MockCounter::new()),
            last_logins.clone(),
            GuardConfig::default(),
        );

        service
            .authenticate("10.0.0.1", "isucon", "donkey")
            .await
            .unwrap();

        // First read falls back to the ledger and shows the only login.
        let user_id = UserId::new(1);
        let shown = last_logins.last_login(&user_id).await.unwrap().unwrap();
        assert_eq!(shown.ip, "10.0.0.1");

        // A second login rolls the cached entry; the display now shows the
        // login before it.
        service
            .authenticate("10.0.0.2", "isucon", "donkey")
            .await
            .unwrap();
        let shown = last_logins.last_login(&user_id).await.unwrap().unwrap();
        assert_eq!(shown.ip, "10.0.0.1");
    }
}
