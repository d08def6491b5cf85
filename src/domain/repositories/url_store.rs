//! Storage capability consumed by the shortening core.

use crate::domain::entities::{CreateOutcome, NewUrlRecord, UrlRecord, UrlRecordPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Key-value persistence for URL records.
///
/// The core owns this interface and never implements storage itself. The
/// one hard requirement on implementations is that [`UrlStore::create_if_absent`]
/// is atomic: two concurrent calls for the same key must see exactly one
/// `Created` and one `Exists`.
///
/// All methods return [`AppError::Storage`] when the backend is unreachable
/// or fails. Callers apply their own timeouts; a timeout surfaces as the same
/// error.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Fetches the record stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlRecord))` if found
    /// - `Ok(None)` if not found
    async fn get(&self, key: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Atomically inserts `record` unless its key is already taken.
    ///
    /// Never overwrites an existing record. When the key is taken, the
    /// existing record is returned in [`CreateOutcome::Exists`].
    async fn create_if_absent(&self, record: NewUrlRecord) -> Result<CreateOutcome, AppError>;

    /// Applies a partial update to the metric fields of `key`.
    ///
    /// Updating a missing key is a no-op. Increments are not required to be
    /// atomic; concurrent updates may lose clicks.
    async fn update(&self, key: &str, patch: UrlRecordPatch) -> Result<(), AppError>;

    /// Deletes the record under `key`.
    ///
    /// Returns `Ok(true)` if a record was deleted, `Ok(false)` if none existed.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Lists records, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError>;

    /// Counts stored records.
    async fn count(&self) -> Result<i64, AppError>;
}
