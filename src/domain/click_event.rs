//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// A resolved lookup waiting to be counted.
///
/// Passed from [`crate::application::services::ResolverService`] to the
/// background worker through a bounded channel, so the lookup never waits
/// on the metrics write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub key: String,
    pub accessed_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(key: impl Into<String>) -> Self {
        Self::at(key, Utc::now())
    }

    /// Creates a click event with an explicit access time.
    pub fn at(key: impl Into<String>, accessed_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            accessed_at,
        }
    }
}
