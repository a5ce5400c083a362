//! Result cache for LLM output.
//!
//! Keys come from [`tomtat_core::cache_key::cache_key`]; entries live for
//! [`tomtat_core::cache_key::CACHE_TTL_SECS`]. Callers treat every
//! [`CacheError`] as a miss.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tomtat_core::cache_key::CACHE_TTL_SECS;

/// Errors from the cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Key-value store for generated results.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` with the configured TTL.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// Redis
// ---------------------------------------------------------------------------

/// Redis-backed cache using a reconnecting [`ConnectionManager`].
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisCache {
    /// Connect to `redis_url` with the default 7-day TTL.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis cache");
        Ok(Self {
            connection,
            ttl_secs: CACHE_TTL_SECS,
        })
    }
}

#[async_trait]
impl SummaryCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let _: () = connection.set_ex(key, value, self.ttl_secs).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Disabled
// ---------------------------------------------------------------------------

/// Cache used when no Redis URL is configured: never stores, always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl SummaryCache for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
