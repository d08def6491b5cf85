//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching key-to-URL mappings.
///
/// Implementations must be thread-safe. Cache failures degrade to store
/// lookups and never fail a request.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the URL cached for `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    async fn get_url(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping with an optional TTL in seconds.
    ///
    /// `None` uses the implementation's default TTL.
    async fn set_url(&self, key: &str, url: &str, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes a cached mapping. Used when a record is deleted.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
