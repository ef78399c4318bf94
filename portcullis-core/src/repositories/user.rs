//! User repository contract.

use async_trait::async_trait;

use crate::{
    Error,
    user::{NewUser, User, UserId},
};

/// Store of user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new account.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find an account by login name.
    ///
    /// This is the guard's resolution step; `None` means the submitted login
    /// matches no account and the attempt is recorded unresolved.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, Error>;
}
