//! URL record entity: one stored key-to-URL mapping.

use chrono::{DateTime, Utc};

/// A stored mapping from a short key to its URL, with click metrics.
///
/// `value` never changes after creation. `click_count` and `last_accessed`
/// are best-effort and may lag behind actual traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub click_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    /// Set when the key came from the fallback generator rather than a hash.
    pub is_fallback: bool,
}

impl UrlRecord {
    /// Creates a record as it looks right after insertion.
    pub fn new(key: String, value: String, created_at: DateTime<Utc>, is_fallback: bool) -> Self {
        Self {
            key,
            value,
            created_at,
            click_count: 0,
            last_accessed: None,
            is_fallback,
        }
    }

    /// Applies a metrics patch in place.
    ///
    /// Both metrics only move forward: a stale patch never lowers the click
    /// count or rewinds the access time.
    pub fn apply(&mut self, patch: &UrlRecordPatch) {
        if let Some(click_count) = patch.click_count {
            self.click_count = self.click_count.max(click_count);
        }
        if let Some(last_accessed) = patch.last_accessed {
            self.last_accessed = self.last_accessed.max(Some(last_accessed));
        }
    }
}

impl From<NewUrlRecord> for UrlRecord {
    fn from(new: NewUrlRecord) -> Self {
        Self::new(new.key, new.value, new.created_at, new.is_fallback)
    }
}

/// Input data for creating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub is_fallback: bool,
}

impl NewUrlRecord {
    /// A record for a hash-derived key.
    pub fn derived(key: String, value: String, created_at: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            created_at,
            is_fallback: false,
        }
    }

    /// A record for a fallback key.
    pub fn fallback(key: String, value: String, created_at: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            created_at,
            is_fallback: true,
        }
    }
}

/// Partial update of the mutable metric fields.
///
/// `None` fields are left unchanged. There is no way to touch `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlRecordPatch {
    pub click_count: Option<u64>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl UrlRecordPatch {
    /// Patch recording one more click on top of `current`.
    pub fn click(current: &UrlRecord, at: DateTime<Utc>) -> Self {
        Self {
            click_count: Some(current.click_count.saturating_add(1)),
            last_accessed: Some(at),
        }
    }
}

/// Result of an atomic create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The key was free; this is the new record.
    Created(UrlRecord),
    /// The key was taken; this is the record that holds it. Nothing was written.
    Exists(UrlRecord),
}
