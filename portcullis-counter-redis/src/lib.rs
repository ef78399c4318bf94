//! Redis failure counter backend for the portcullis login guard
//!
//! Keeps the consecutive-failure counters in Redis: `INCR` for failures,
//! `DEL` for the reset on success, `GET` for the threshold reads. Per-key
//! atomicity comes straight from Redis's single-threaded command execution,
//! so no scripting is needed.
//!
//! All errors surface as [`CounterError::Unavailable`]; the guard decides
//! what an unavailable counter means (it fails open).

use async_trait::async_trait;
use portcullis_core::{
    Error,
    error::CounterError,
    repositories::{CounterKey, FailureCounter},
};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Failure counter backed by a shared Redis connection.
///
/// [`ConnectionManager`] multiplexes and reconnects internally; cloning it
/// per call is the intended usage and keeps the methods `&self`.
pub struct RedisFailureCounter {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisFailureCounter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            key_prefix: "portcullis".to_string(),
        }
    }

    /// Set the key prefix, for deployments sharing a Redis with other apps.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Connect to Redis and build a counter around the connection.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client =
            Client::open(url).map_err(|e| CounterError::Unavailable(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CounterError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Round-trip a PING to verify the connection.
    pub async fn ping(&self) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| CounterError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn counter_key(&self, key: &CounterKey) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl FailureCounter for RedisFailureCounter {
    async fn record_success(&self, key: &CounterKey) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(self.counter_key(key))
            .await
            .map_err(|e| CounterError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn record_failure(&self, key: &CounterKey) -> Result<u64, Error> {
        let mut conn = self.conn.clone();
        let count: i64 = conn
            .incr(self.counter_key(key), 1)
            .await
            .map_err(|e| CounterError::Unavailable(e.to_string()))?;
        Ok(count.max(0) as u64)
    }

    async fn read(&self, key: &CounterKey) -> Result<Option<u64>, Error> {
        let mut conn = self.conn.clone();
        let count: Option<i64> = conn
            .get(self.counter_key(key))
            .await
            .map_err(|e| CounterError::Unavailable(e.to_string()))?;
        Ok(count.map(|n| n.max(0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::user::UserId;

    async fn live_counter() -> RedisFailureCounter {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        RedisFailureCounter::connect(&url)
            .await
            .expect("Failed to connect to Redis")
            .with_key_prefix(format!("portcullis-test-{}", std::process::id()))
    }

    #[tokio::test]
    #[ignore] // needs a running Redis instance
    async fn test_counter_roundtrip() {
        let counter = live_counter().await;
        let key = CounterKey::user(UserId::new(1));

        counter.record_success(&key).await.unwrap();
        assert_eq!(counter.read(&key).await.unwrap(), None);

        assert_eq!(counter.record_failure(&key).await.unwrap(), 1);
        assert_eq!(counter.record_failure(&key).await.unwrap(), 2);
        assert_eq!(counter.read(&key).await.unwrap(), Some(2));

        // Resetting twice in a row is a no-op both times.
        counter.record_success(&key).await.unwrap();
        counter.record_success(&key).await.unwrap();
        assert_eq!(counter.read(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // needs a running Redis instance
    async fn test_account_and_address_keys_are_independent() {
        let counter = live_counter().await;
        let user_key = CounterKey::user(UserId::new(2));
        let ip_key = CounterKey::ip("2");

        counter.record_success(&user_key).await.unwrap();
        counter.record_success(&ip_key).await.unwrap();

        counter.record_failure(&user_key).await.unwrap();
        assert_eq!(counter.read(&user_key).await.unwrap(), Some(1));
        assert_eq!(counter.read(&ip_key).await.unwrap(), None);

        counter.record_success(&user_key).await.unwrap();
        counter.record_success(&ip_key).await.unwrap();
    }
}
