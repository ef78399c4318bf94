//! Guard thresholds.
//!
//! Thresholds are read once at startup and never change while the guard is
//! running. An unparseable environment value is a startup error, not a silent
//! fall back to the default: a typo in a lockout threshold should stop the
//! deploy, not quietly loosen the policy.

use std::env;

use crate::error::ConfigError;

/// Environment variable for the per-account lockout threshold.
pub const ENV_USER_LOCK_THRESHOLD: &str = "PORTCULLIS_USER_LOCK_THRESHOLD";

/// Environment variable for the per-address ban threshold.
pub const ENV_IP_BAN_THRESHOLD: &str = "PORTCULLIS_IP_BAN_THRESHOLD";

/// Thresholds the guard enforces.
///
/// Both counts are consecutive failures since the last success for the key in
/// question. Read-only after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// Consecutive failures after which an account is locked.
    pub user_lock_threshold: u32,
    /// Consecutive failures after which a client address is banned.
    pub ip_ban_threshold: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            user_lock_threshold: 3,
            ip_ban_threshold: 10,
        }
    }
}

impl GuardConfig {
    /// Load thresholds from the environment, falling back to the defaults
    /// for unset (or empty) variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            user_lock_threshold: threshold_from_env(
                ENV_USER_LOCK_THRESHOLD,
                defaults.user_lock_threshold,
            )?,
            ip_ban_threshold: threshold_from_env(ENV_IP_BAN_THRESHOLD, defaults.ip_ban_threshold)?,
        })
    }
}

fn threshold_from_env(name: &str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(value) if value.is_empty() => Ok(default),
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
