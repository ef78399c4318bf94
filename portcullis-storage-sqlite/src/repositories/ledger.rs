//! SQLite implementation of the attempt ledger.

use async_trait::async_trait;
use chrono::DateTime;
use portcullis_core::{
    Error,
    attempt::{LoginAttempt, NewLoginAttempt},
    error::StorageError,
    repositories::AttemptLedger,
    user::UserId,
};
use sqlx::SqlitePool;

/// SQLite ledger of login attempts.
///
/// Each reconciliation query runs as two statements: one pass over keys that
/// have never succeeded, one pass over keys whose last success is followed by
/// enough failures. The passes cover disjoint keys, so concatenating their
/// results needs no dedup.
pub struct SqliteAttemptLedger {
    pool: SqlitePool,
}

impl SqliteAttemptLedger {
    /// Create a new SQLite attempt ledger.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    id: i64,
    created_at: i64,
    user_id: Option<i64>,
    login: String,
    ip: String,
    succeeded: bool,
}

impl From<SqliteLoginAttempt> for LoginAttempt {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            created_at: DateTime::from_timestamp(row.created_at, 0).expect("Invalid timestamp"),
            user_id: row.user_id.map(UserId::new),
            login: row.login,
            ip: row.ip,
            succeeded: row.succeeded,
        }
    }
}

#[async_trait]
impl AttemptLedger for SqliteAttemptLedger {
    async fn append(&self, attempt: NewLoginAttempt) -> Result<LoginAttempt, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (created_at, user_id, login, ip, succeeded)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(attempt.created_at.timestamp())
        .bind(attempt.user_id.map(|id| id.as_i64()))
        .bind(&attempt.login)
        .bind(&attempt.ip)
        .bind(attempt.succeeded)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login attempt");
            StorageError::Database("Failed to record login attempt".to_string())
        })?;

        Ok(row.into())
    }

    async fn banned_ips(&self, threshold: u32) -> Result<Vec<String>, Error> {
        // Addresses that have never logged in successfully.
        let mut ips: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT ip
            FROM (
                SELECT ip, MAX(succeeded) AS max_succeeded, COUNT(1) AS cnt
                FROM login_attempts
                GROUP BY ip
            ) AS t0
            WHERE t0.max_succeeded = 0 AND t0.cnt >= ?
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query banned ips");
            StorageError::Database("Failed to query banned ips".to_string())
        })?;

        // Addresses whose last success is followed by enough failures. Every
        // row after the last success is a failure, so a plain count suffices.
        let last_successes = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT ip, MAX(id) AS last_success_id
            FROM login_attempts
            WHERE succeeded = 1
            GROUP BY ip
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query banned ips");
            StorageError::Database("Failed to query banned ips".to_string())
        })?;

        for (ip, last_success_id) in last_successes {
            let failures: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM login_attempts WHERE ip = ? AND id > ?",
            )
            .bind(&ip)
            .bind(last_success_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to query banned ips");
                StorageError::Database("Failed to query banned ips".to_string())
            })?;

            if failures >= i64::from(threshold) {
                ips.push(ip);
            }
        }

        Ok(ips)
    }

    async fn locked_logins(&self, threshold: u32) -> Result<Vec<String>, Error> {
        // Accounts that have never logged in successfully. The bare login
        // column is well-defined here: SQLite takes it from the row that
        // produced MAX(succeeded), and resolved attempts all carry the
        // account's login name.
        let mut logins: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT login
            FROM (
                SELECT user_id, login, MAX(succeeded) AS max_succeeded, COUNT(1) AS cnt
                FROM login_attempts
                WHERE user_id IS NOT NULL
                GROUP BY user_id
            ) AS t0
            WHERE t0.max_succeeded = 0 AND t0.cnt >= ?
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query locked logins");
            StorageError::Database("Failed to query locked logins".to_string())
        })?;

        // Accounts whose last success is followed by enough failures.
        let last_successes = sqlx::query_as::<_, (i64, String, i64)>(
            r#"
            SELECT user_id, login, MAX(id) AS last_success_id
            FROM login_attempts
            WHERE user_id IS NOT NULL AND succeeded = 1
            GROUP BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query locked logins");
            StorageError::Database("Failed to query locked logins".to_string())
        })?;

        for (user_id, login, last_success_id) in last_successes {
            let failures: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM login_attempts WHERE user_id = ? AND id > ?",
            )
            .bind(user_id)
            .bind(last_success_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to query locked logins");
                StorageError::Database("Failed to query locked logins".to_string())
            })?;

            if failures >= i64::from(threshold) {
                logins.push(login);
            }
        }

        Ok(logins)
    }

    async fn recent_successes(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<LoginAttempt>, Error> {
        let rows = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            SELECT *
            FROM login_attempts
            WHERE user_id = ? AND succeeded = 1
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.as_i64())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query recent successes");
            StorageError::Database("Failed to query recent successes".to_string())
        })?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}
