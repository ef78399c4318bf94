//! Login attempt records.
//!
//! Every authentication attempt, successful or not, produces exactly one
//! attempt record in the durable ledger. Records are append-only: the guard
//! never mutates or deletes them, and the audit queries recompute ban and
//! lock state purely from this history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// A single recorded authentication attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginAttempt {
    /// Ledger-assigned identifier, strictly increasing in append order.
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// Resolved account, if the submitted login matched one.
    pub user_id: Option<UserId>,
    /// The login name as submitted, kept even when no account matched.
    pub login: String,
    pub ip: String,
    pub succeeded: bool,
}

/// Insert-side representation of an attempt, before the ledger assigns an id.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub created_at: DateTime<Utc>,
    pub user_id: Option<UserId>,
    pub login: String,
    pub ip: String,
    pub succeeded: bool,
}

impl NewLoginAttempt {
    /// Stamp a new attempt with the current time.
    pub fn new(
        ip: impl Into<String>,
        login: impl Into<String>,
        user_id: Option<UserId>,
        succeeded: bool,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            user_id,
            login: login.into(),
            ip: ip.into(),
            succeeded,
        }
    }
}

/// A successful login as shown to the user ("last login" box on the member
/// page): who, from where, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastLogin {
    pub user_id: UserId,
    pub login: String,
    pub ip: String,
    pub at: DateTime<Utc>,
}

impl LastLogin {
    /// Build from a successful, account-resolved attempt. Returns `None` for
    /// failures and for attempts that never matched an account.
    pub fn from_attempt(attempt: &LoginAttempt) -> Option<Self> {
        if !attempt.succeeded {
            return None;
        }
        attempt.user_id.map(|user_id| Self {
            user_id,
            login: attempt.login.clone(),
            ip: attempt.ip.clone(),
            at: attempt.created_at,
        })
    }
}

/// Resolve the client address for an attempt.
///
/// A non-empty forwarded-for header wins over the transport-layer peer
/// address. The header is attacker-controlled when the app is reached without
/// a trusted proxy in front; the deployment assumes one, and the guard keys
/// IP counters off whatever this returns.
pub fn client_addr(peer: &str, forwarded_for: Option<&str>) -> String {
    match forwarded_for {
        Some(header) if !header.is_empty() => header.to_string(),
        _ => peer.to_string(),
    }
}
