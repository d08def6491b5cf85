//! Create path: assigns a unique key to a URL.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::KeySettings;
use crate::domain::entities::{CreateOutcome, NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlStore;
use crate::error::AppError;
use crate::utils::key_deriver::{KeyDeriver, generate_fallback_key};
use crate::utils::url_validator::UrlValidator;

/// Fallback keys are random; a taken one is simply drawn again.
const FALLBACK_ATTEMPTS: usize = 3;

/// How a create request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// A new record under a hash-derived key.
    Fresh,
    /// The same URL was already stored under one of its derived keys.
    Existing,
    /// Every hash attempt collided; a new record under a fallback key.
    Fallback,
}

/// A created or reused record together with how it was obtained.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub record: UrlRecord,
    pub assignment: Assignment,
}

impl ShortenOutcome {
    pub fn is_new(&self) -> bool {
        self.assignment != Assignment::Existing
    }
}

/// Collision-arbitrating service behind `POST /api/url`.
///
/// Combines the validator, the key deriver and the store. Holds no locks;
/// uniqueness rests entirely on [`UrlStore::create_if_absent`].
pub struct UrlService {
    store: Arc<dyn UrlStore>,
    validator: UrlValidator,
    deriver: KeyDeriver,
    max_retries: u32,
}

impl UrlService {
    /// Creates a new URL service.
    pub fn new(store: Arc<dyn UrlStore>, validator: UrlValidator, keys: &KeySettings) -> Self {
        Self {
            store,
            validator,
            deriver: KeyDeriver::new(keys),
            max_retries: keys.max_retries,
        }
    }

    /// Shortens `long_url` with the configured retry budget.
    ///
    /// See [`Self::create_short_url_with_retries`].
    pub async fn create_short_url(&self, long_url: &str) -> Result<ShortenOutcome, AppError> {
        self.create_short_url_with_retries(long_url, self.max_retries)
            .await
    }

    /// Shortens `long_url`, trying up to `max_retries` derived keys.
    ///
    /// # Algorithm
    ///
    /// For each attempt the derived key is offered to the store with an
    /// atomic create-if-absent:
    ///
    /// - key free: the new record is returned
    /// - key holds the same validated URL: that record is returned unchanged
    /// - key holds another URL: a genuine collision, next attempt
    ///
    /// When every attempt collides, the URL is stored under a fallback key
    /// (not reproducible) with `is_fallback` set.
    ///
    /// The validated form (trimmed, scheme applied, path and query case
    /// untouched) is what gets hashed, stored and compared.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is rejected.
    /// Returns [`AppError::Storage`] from the store, without retrying.
    pub async fn create_short_url_with_retries(
        &self,
        long_url: &str,
        max_retries: u32,
    ) -> Result<ShortenOutcome, AppError> {
        let normalized = self.validator.validate(long_url)?;
        let value = normalized.as_str();

        for attempt in 0..max_retries {
            let key = self.deriver.derive(value, attempt);
            let new_record = NewUrlRecord::derived(key.clone(), value.to_string(), Utc::now());

            match self.store.create_if_absent(new_record).await? {
                CreateOutcome::Created(record) => {
                    metrics::counter!("shortkey_urls_created_total").increment(1);
                    info!(key = %record.key, attempt, "Short URL created");
                    return Ok(ShortenOutcome {
                        record,
                        assignment: Assignment::Fresh,
                    });
                }
                CreateOutcome::Exists(existing) if existing.value == value => {
                    metrics::counter!("shortkey_dedup_hits_total").increment(1);
                    debug!(key = %existing.key, attempt, "URL already shortened");
                    return Ok(ShortenOutcome {
                        record: existing,
                        assignment: Assignment::Existing,
                    });
                }
                CreateOutcome::Exists(_) => {
                    metrics::counter!("shortkey_collisions_total").increment(1);
                    debug!(key = %key, attempt = attempt + 1, "Collision detected");
                }
            }
        }

        warn!(
            attempts = max_retries,
            "Hash attempts exhausted, assigning fallback key"
        );
        metrics::counter!("shortkey_fallback_keys_total").increment(1);

        let record = self.create_fallback(value).await?;

        Ok(ShortenOutcome {
            record,
            assignment: Assignment::Fallback,
        })
    }

    /// Stores `value` under a freshly drawn fallback key.
    async fn create_fallback(&self, value: &str) -> Result<UrlRecord, AppError> {
        for _ in 0..FALLBACK_ATTEMPTS {
            let key = generate_fallback_key(self.deriver.key_length());
            let new_record = NewUrlRecord::fallback(key, value.to_string(), Utc::now());

            match self.store.create_if_absent(new_record).await? {
                CreateOutcome::Created(record) => {
                    info!(key = %record.key, "Short URL created with fallback key");
                    return Ok(record);
                }
                CreateOutcome::Exists(existing) => {
                    debug!(key = %existing.key, "Fallback key taken, drawing another");
                }
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique key",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}
