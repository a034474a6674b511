use async_trait::async_trait;
use linkzap_core::cache::{Result, ENTRY_KEY_PREFIX};
use linkzap_core::{CacheEntry, CacheError, CounterStore, LinkCache, ShortCode};
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// Redis-backed link cache and allocation counter.
///
/// Entries are stored as hashes under `"url:" + code` (configurable prefix),
/// one string field per [`CacheEntry`] field. The counter is a plain integer
/// key driven by `INCR`, so uniqueness of allocations rests on Redis
/// serializing commands.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisStore {
    /// Wraps an existing connection manager.
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self::with_prefix(conn, ENTRY_KEY_PREFIX)
    }

    /// Wraps an existing connection manager with a custom entry key prefix
    /// (e.g., "myapp:url:").
    pub fn with_prefix(conn: redis::aio::ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a managed connection to `redis_url` and verifies it with `PING`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!(redis_url, "connecting to Redis");

        let client = redis::Client::open(redis_url).map_err(|e| {
            CacheError::Initialization(format!("failed to create Redis client: {e}"))
        })?;
        let mut conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        conn.ping::<()>()
            .await
            .map_err(|e| map_redis_error("Redis PING failed", e))?;

        Ok(Self::new(conn))
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl LinkCache for RedisStore {
    async fn get_entry(&self, code: &ShortCode) -> Result<Option<CacheEntry>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching entry from Redis cache");

        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn
            .hgetall(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch hash from Redis", e))?;

        match CacheEntry::from_fields(&fields) {
            Ok(Some(entry)) => {
                debug!(code = %code, "Cache hit in Redis");
                Ok(Some(entry))
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cached hash is malformed");
                Err(e)
            }
        }
    }

    async fn set_entry(&self, entry: &CacheEntry) -> Result<()> {
        let key = self.cache_key(&entry.short_code);
        trace!(code = %entry.short_code, "Storing entry in Redis cache");

        // DEL first so a cleared expiry does not survive as a stale field.
        let fields = entry.to_fields();
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, fields.as_slice())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to write hash to Redis", e))?;

        debug!(code = %entry.short_code, "Cached entry in Redis");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Removing entry from Redis cache");

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| map_redis_error("failed to delete key from Redis", e))?;

        debug!(code = %code, "Removed entry from Redis cache");
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| map_redis_error("failed to increment counter", e))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(key)
            .await
            .map_err(|e| map_redis_error("failed to check counter", e))
    }

    async fn set_if_absent(&self, key: &str, value: i64) -> Result<bool> {
        let mut conn = self.conn.clone();
        conn.set_nx::<_, _, bool>(key, value)
            .await
            .map_err(|e| map_redis_error("failed to seed counter", e))
    }
}
