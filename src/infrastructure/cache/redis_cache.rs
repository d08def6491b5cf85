//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Namespace for every key this service writes.
const KEY_NAMESPACE: &str = "shortkey:";

/// Redis cache in front of the URL store.
///
/// Only `key -> value` pairs are cached; metrics always come from the store.
/// Every operation is fail-open: a Redis error is logged and reported as a
/// miss (reads) or a success (writes), so lookups fall through to the store.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// `default_ttl_seconds` applies to entries written without an explicit TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::ConnectionError(format!("invalid Redis URL: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::ConnectionError(format!("connect failed: {}", e)))?;

        conn.ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("PING failed: {}", e)))?;

        info!(ttl_seconds = default_ttl_seconds, "Connected to Redis");

        Ok(Self {
            conn,
            default_ttl: default_ttl_seconds,
        })
    }
}

fn namespaced(key: &str) -> String {
    format!("{}{}", KEY_NAMESPACE, key)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();

        let cached = conn
            .get::<_, Option<String>>(namespaced(key))
            .await
            .unwrap_or_else(|e| {
                warn!(key, error = %e, "Redis GET failed, treating as miss");
                None
            });

        debug!(key, hit = cached.is_some(), "Redis lookup");
        Ok(cached)
    }

    async fn set_url(&self, key: &str, url: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        if let Err(e) = conn.set_ex::<_, _, ()>(namespaced(key), url, ttl).await {
            warn!(key, error = %e, "Redis SET failed");
        } else {
            debug!(key, ttl, "Cached URL");
        }

        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();

        match conn.del::<_, i64>(namespaced(key)).await {
            Ok(removed) if removed > 0 => debug!(key, "Evicted cached URL"),
            Ok(_) => {}
            Err(e) => warn!(key, error = %e, "Redis DEL failed"),
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
