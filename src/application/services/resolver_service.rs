//! Lookup path: resolves keys back to URLs and serves record administration.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlStore;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Shape shared by hash-derived (hex) and fallback (base-36) keys.
static KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-z]{4,16}$").expect("static key pattern is valid")
});

/// Service resolving keys and exposing per-record statistics.
pub struct ResolverService {
    store: Arc<dyn UrlStore>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
}

impl ResolverService {
    /// Creates a new resolver service.
    pub fn new(
        store: Arc<dyn UrlStore>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            store,
            cache,
            click_sender,
        }
    }

    /// Resolves `key` to its URL.
    ///
    /// # Request Flow
    ///
    /// 1. Check cache; a cache error falls back to the store
    /// 2. On miss, read the store and fill the cache in the background
    /// 3. Queue a click event without waiting (dropped when the queue is full)
    ///
    /// The returned URL never depends on the health of the metrics write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `key` is empty.
    /// Returns [`AppError::NotFound`] if no record exists under `key`.
    /// Returns [`AppError::Storage`] if the store cannot be read.
    pub async fn find_long_url(&self, key: &str) -> Result<String, AppError> {
        check_key(key)?;

        let long_url = match self.cache.get_url(key).await {
            Ok(Some(cached_url)) => {
                debug!("Cache HIT for {}", key);
                cached_url
            }
            Ok(None) => {
                debug!("Cache MISS for {}", key);
                let record = self.fetch(key).await?;

                let cache = self.cache.clone();
                let cache_key = key.to_string();
                let url = record.value.clone();
                tokio::spawn(async move {
                    if let Err(e) = cache.set_url(&cache_key, &url, None).await {
                        error!("Failed to cache URL: {}", e);
                    }
                });

                record.value
            }
            Err(e) => {
                error!("Cache error: {}", e);
                self.fetch(key).await?.value
            }
        };

        self.track_click(key);

        Ok(long_url)
    }

    /// Returns the full record for `key`, including click metrics.
    ///
    /// Reads the store directly; statistics never come from the cache.
    ///
    /// # Errors
    ///
    /// Same as [`Self::find_long_url`].
    pub async fn get_stats(&self, key: &str) -> Result<UrlRecord, AppError> {
        check_key(key)?;
        self.fetch(key).await
    }

    /// Deletes the record under `key` and drops its cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing was stored under `key`.
    /// Returns [`AppError::Storage`] on store failures.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        check_key(key)?;

        if !self.store.delete(key).await? {
            return Err(not_found(key));
        }

        if let Err(e) = self.cache.invalidate(key).await {
            error!("Failed to invalidate cache for {}: {}", key, e);
        }

        Ok(())
    }

    /// Lists records for administration, newest first.
    ///
    /// `page` is 1-indexed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a page or page size below 1, or
    /// when the page lies beyond any representable offset.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<Vec<UrlRecord>, AppError> {
        if page < 1 || page_size < 1 {
            return Err(AppError::bad_request(
                "Page and page size must be at least 1",
                json!({ "page": page, "page_size": page_size }),
            ));
        }

        let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
            AppError::bad_request(
                "Page is out of range",
                json!({ "page": page, "page_size": page_size }),
            )
        })?;

        self.store.list(page_size, offset).await
    }

    /// Counts stored records.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.store.count().await
    }

    async fn fetch(&self, key: &str) -> Result<UrlRecord, AppError> {
        self.store.get(key).await?.ok_or_else(|| not_found(key))
    }

    fn track_click(&self, key: &str) {
        if self.click_sender.try_send(ClickEvent::new(key)).is_err() {
            metrics::counter!("shortkey_clicks_dropped_total").increment(1);
            debug!("Click queue full or closed, dropping click for {}", key);
        }
    }
}

/// Rejects empty keys and short-circuits keys no generator can produce.
fn check_key(key: &str) -> Result<(), AppError> {
    if key.is_empty() {
        return Err(AppError::bad_request("Key is required", json!({})));
    }

    if !KEY_REGEX.is_match(key) {
        return Err(not_found(key));
    }

    Ok(())
}

fn not_found(key: &str) -> AppError {
    AppError::not_found("URL not found", json!({ "key": key }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlStore;
    use crate::infrastructure::cache::{CacheError, CacheResult, NullCache};
    use async_trait::async_trait;
    use chrono::Utc;

    fn record(key: &str, value: &str) -> UrlRecord {
        UrlRecord::new(key.to_string(), value.to_string(), Utc::now(), false)
    }

    fn resolver(store: MockUrlStore) -> (ResolverService, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (
            ResolverService::new(Arc::new(store), Arc::new(NullCache::new()), tx),
            rx,
        )
    }

    struct FailingCache;

    #[async_trait]
    impl CacheService for FailingCache {
        async fn get_url(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn set_url(&self, _key: &str, _url: &str, _ttl: Option<u64>) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn invalidate(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_find_long_url_success() {
        let mut store = MockUrlStore::new();
        store
            .expect_get()
            .withf(|key| key == "abcd1234")
            .times(1)
            .returning(|key| Ok(Some(record(key, "https://example.com/a"))));

        let (resolver, mut rx) = resolver(store);
        let url = resolver.find_long_url("abcd1234").await.unwrap();

        assert_eq!(url, "https://example.com/a");
        assert_eq!(rx.try_recv().unwrap().key, "abcd1234");
    }

    #[tokio::test]
    async fn test_find_long_url_not_found() {
        let mut store = MockUrlStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));

        let (resolver, mut rx) = resolver(store);
        let result = resolver.find_long_url("abcd1234").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_key_is_validation_error() {
        let mut store = MockUrlStore::new();
        store.expect_get().times(0);

        let (resolver, _rx) = resolver(store);
        let result = resolver.find_long_url("").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_impossible_key_skips_store() {
        let mut store = MockUrlStore::new();
        store.expect_get().times(0);

        let (resolver, _rx) = resolver(store);

        for key in ["abc", "ABCD1234", "abcd-1234", "a".repeat(17).as_str()] {
            let result = resolver.find_long_url(key).await;
            assert!(matches!(result, Err(AppError::NotFound { .. })), "{}", key);
        }
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut store = MockUrlStore::new();
        store
            .expect_get()
            .returning(|_| Err(AppError::storage("Storage unavailable", json!({}))));

        let (resolver, _rx) = resolver(store);
        let result = resolver.find_long_url("abcd1234").await;

        assert!(matches!(result, Err(AppError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_full_click_queue_does_not_fail_lookup() {
        let mut store = MockUrlStore::new();
        store
            .expect_get()
            .returning(|key| Ok(Some(record(key, "https://example.com/a"))));

        let (tx, _rx) = mpsc::channel(1);
        let resolver = ResolverService::new(Arc::new(store), Arc::new(NullCache::new()), tx);

        for _ in 0..5 {
            assert_eq!(
                resolver.find_long_url("abcd1234").await.unwrap(),
                "https://example.com/a"
            );
        }
    }

    #[tokio::test]
    async fn test_closed_click_queue_does_not_fail_lookup() {
        let mut store = MockUrlStore::new();
        store
            .expect_get()
            .returning(|key| Ok(Some(record(key, "https://example.com/a"))));

        let (resolver, rx) = resolver(store);
        drop(rx);

        assert!(resolver.find_long_url("abcd1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_store() {
        let mut store = MockUrlStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|key| Ok(Some(record(key, "https://example.com/a"))));

        let (tx, _rx) = mpsc::channel(4);
        let resolver = ResolverService::new(Arc::new(store), Arc::new(FailingCache), tx);

        assert_eq!(
            resolver.find_long_url("abcd1234").await.unwrap(),
            "https://example.com/a"
        );
    }

    #[tokio::test]
    async fn test_get_stats() {
        let mut store = MockUrlStore::new();
        store.expect_get().returning(|key| {
            let mut record = record(key, "https://example.com/a");
            record.click_count = 7;
            Ok(Some(record))
        });

        let (resolver, mut rx) = resolver(store);
        let stats = resolver.get_stats("abcd1234").await.unwrap();

        assert_eq!(stats.click_count, 7);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut store = MockUrlStore::new();
        store.expect_delete().times(1).returning(|_| Ok(false));

        let (resolver, _rx) = resolver(store);
        let result = resolver.delete("abcd1234").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_survives_cache_failure() {
        let mut store = MockUrlStore::new();
        store.expect_delete().times(1).returning(|_| Ok(true));

        let (tx, _rx) = mpsc::channel(4);
        let resolver = ResolverService::new(Arc::new(store), Arc::new(FailingCache), tx);

        assert!(resolver.delete("abcd1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let mut store = MockUrlStore::new();
        store
            .expect_list()
            .withf(|limit, offset| *limit == 20 && *offset == 40)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let (resolver, _rx) = resolver(store);

        assert!(resolver.list(3, 20).await.unwrap().is_empty());
        assert!(resolver.list(0, 20).await.is_err());
    }

    #[tokio::test]
    async fn test_list_rejects_offset_overflow() {
        let mut store = MockUrlStore::new();
        store.expect_list().never();

        let (resolver, _rx) = resolver(store);

        let result = resolver.list(i64::MAX, 2).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let result = resolver.list(3, i64::MAX).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
