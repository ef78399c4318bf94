use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Error,
    attempt::{LoginAttempt, NewLoginAttempt},
    repositories::{AttemptLedger, RepositoryProvider, UserRepository},
    user::{NewUser, User, UserId},
};

/// Adapter that wraps a RepositoryProvider and implements individual
/// repository traits, so services stay generic over a single provider type.
pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_login(login).await
    }
}

pub struct AttemptLedgerAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AttemptLedgerAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AttemptLedger for AttemptLedgerAdapter<R> {
    async fn append(&self, attempt: NewLoginAttempt) -> Result<LoginAttempt, Error> {
        self.provider.ledger().append(attempt).await
    }

    async fn banned_ips(&self, threshold: u32) -> Result<Vec<String>, Error> {
        self.provider.ledger().banned_ips(threshold).await
    }

    async fn locked_logins(&self, threshold: u32) -> Result<Vec<String>, Error> {
        self.provider.ledger().locked_logins(threshold).await
    }

    async fn recent_successes(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<LoginAttempt>, Error> {
        self.provider.ledger().recent_successes(user_id, limit).await
    }
}
