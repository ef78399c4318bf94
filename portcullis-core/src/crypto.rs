//! Credential digest utilities.
//!
//! Passwords are stored as a salted SHA-256 digest: the lowercase hex encoding
//! of `SHA256("{password}:{salt}")`. The scheme is fixed by the stored data;
//! changing it would invalidate every existing account.
//!
//! Verification uses constant-time comparison via the `subtle` crate so the
//! digest check does not leak a timing signal on the first differing byte.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compute the stored digest for a password and salt.
///
/// # Arguments
///
/// * `password` - The plaintext password
/// * `salt` - The per-account salt
///
/// # Returns
///
/// A lowercase hex-encoded SHA-256 digest (64 characters)
pub fn password_digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{password}:{salt}").as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random per-account salt.
///
/// Produces 128 bits of OS randomness encoded as hex (32 characters).
///
/// # Panics
///
/// Panics if the OS random number generator fails. This indicates a critical
/// system failure (e.g. /dev/urandom unavailable) from which recovery is not
/// possible for security-sensitive operations.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    hex::encode(bytes)
}

/// Verify a password against a stored digest with constant-time comparison.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let computed = password_digest(password, salt);
    constant_time_compare(computed.as_bytes(), stored_hash.as_bytes())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
