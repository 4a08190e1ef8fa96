//! Redis-backed term store.
//!
//! The queue is a plain Redis set, so it can be inspected and edited with
//! `SMEMBERS`/`SADD` from any client.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::{QueueError, Result};
use crate::store::TermStore;

/// Term store over one Redis set.
pub struct RedisTermStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisTermStore {
    /// Connect to Redis and bind to the set at `key`.
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `key` - Name of the set holding the terms (e.g., "fb_channels")
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| QueueError::Connection(format!("Redis connection error: {}", e)))?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            QueueError::Connection(format!("Redis connection manager error: {}", e))
        })?;

        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    /// Name of the backing set
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl TermStore for RedisTermStore {
    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&self.key)
            .await
            .map_err(|e| QueueError::Command(e.to_string()))
    }

    async fn contains(&self, term: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.sismember(&self.key, term)
            .await
            .map_err(|e| QueueError::Command(e.to_string()))
    }

    async fn add(&self, term: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let added: i64 = conn
            .sadd(&self.key, term)
            .await
            .map_err(|e| QueueError::Command(e.to_string()))?;
        Ok(added > 0)
    }

    async fn members(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(&self.key)
            .await
            .map_err(|e| QueueError::Command(e.to_string()))
    }
}
