//! User accounts guarded by the login protection layer.
//!
//! Users carry their salted credential digest so the guard can verify a
//! password without a second storage round trip. The digest scheme lives in
//! [`crate::crypto`].

use serde::{Deserialize, Serialize};

use crate::crypto;

/// A unique, stable identifier for a specific user.
///
/// Account identifiers are integers assigned by the user store. Keeping the
/// integer exposed (rather than treating the id as opaque) is deliberate: the
/// last-login cache partitions entries by the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account as stored by the user repository.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub salt: String,
}

impl User {
    /// Check a candidate password against the stored digest.
    pub fn verify_password(&self, password: &str) -> bool {
        crypto::verify_password(password, &self.salt, &self.password_hash)
    }
}

/// Insert-side representation of a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub salt: String,
}

impl NewUser {
    /// Build a new account from a plaintext password, generating a fresh salt.
    pub fn with_password(login: impl Into<String>, password: &str) -> Self {
        let salt = crypto::generate_salt();
        let password_hash = crypto::password_digest(password, &salt);
        Self {
            login: login.into(),
            password_hash,
            salt,
        }
    }
}
